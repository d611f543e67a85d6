//! Running-balance ledger derived from the transaction set.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::transaction::{Transaction, TransactionKind};

/// A transaction paired with the balance right after it is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub transaction: Transaction,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerTotals {
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

/// Date-ordered ledger with running balances.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunningLedger {
    pub opening_balance: Decimal,
    pub entries: Vec<LedgerEntry>,
}

impl RunningLedger {
    pub fn closing_balance(&self) -> Decimal {
        self.entries
            .last()
            .map(|entry| entry.balance)
            .unwrap_or(self.opening_balance)
    }

    pub fn entry(&self, row: usize) -> Option<&LedgerEntry> {
        self.entries.get(row)
    }

    /// Resolves a displayed row back to the identity of its transaction.
    pub fn id_at(&self, row: usize) -> Option<Uuid> {
        self.entry(row).map(|entry| entry.transaction.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn totals(&self) -> LedgerTotals {
        let mut totals = LedgerTotals::default();
        for entry in &self.entries {
            match entry.transaction.kind {
                TransactionKind::Income => {
                    totals.income = totals.income.saturating_add(entry.transaction.amount)
                }
                TransactionKind::Expense => {
                    totals.expense = totals.expense.saturating_add(entry.transaction.amount)
                }
            }
        }
        totals.net = totals.income.saturating_sub(totals.expense);
        totals
    }
}

/// Sorts `transactions` by date and attaches the running balance to each.
///
/// Each transaction is applied once, on its recorded date, whatever its
/// frequency. Transactions sharing a date keep their insertion order.
pub fn compute_ledger(opening_balance: Decimal, transactions: &[Transaction]) -> RunningLedger {
    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    sorted.sort_by_key(|txn| txn.date);

    let mut balance = opening_balance;
    let entries = sorted
        .into_iter()
        .map(|txn| {
            balance = txn.apply_to(balance);
            LedgerEntry {
                transaction: txn.clone(),
                balance,
            }
        })
        .collect();

    RunningLedger {
        opening_balance,
        entries,
    }
}
