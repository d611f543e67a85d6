//! Day-by-day balance projection over a fixed horizon.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{
    calendar::{add_months, DateRange},
    transaction::Transaction,
};

pub const DEFAULT_HORIZON_MONTHS: u32 = 24;

/// One transaction firing on a projected day, with the balance right after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub transaction: Transaction,
    pub balance_after: Decimal,
}

/// A calendar day of the projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRow {
    pub date: NaiveDate,
    pub occurrences: Vec<Occurrence>,
    pub balance_after: Decimal,
}

impl DayRow {
    /// True when nothing happens on this day and the balance is only carried forward.
    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    pub fn net_change(&self) -> Decimal {
        self.occurrences
            .iter()
            .fold(Decimal::ZERO, |net, occurrence| occurrence.transaction.apply_to(net))
    }
}

/// Lazy iterator producing one [`DayRow`] per day from the start date to
/// `start + horizon` months, inclusive.
#[derive(Debug, Clone)]
pub struct DailyProjection<'a> {
    days: Option<DateRange>,
    transactions: &'a [Transaction],
    balance: Decimal,
}

impl<'a> DailyProjection<'a> {
    pub fn empty(transactions: &'a [Transaction], opening_balance: Decimal) -> Self {
        Self {
            days: None,
            transactions,
            balance: opening_balance,
        }
    }
}

impl Iterator for DailyProjection<'_> {
    type Item = DayRow;

    fn next(&mut self) -> Option<DayRow> {
        let date = self.days.as_mut()?.next()?;
        let mut occurrences = Vec::new();
        // Same-day transactions apply in the order the set holds them.
        for txn in self.transactions.iter().filter(|txn| txn.occurs_on(date)) {
            self.balance = txn.apply_to(self.balance);
            occurrences.push(Occurrence {
                transaction: txn.clone(),
                balance_after: self.balance,
            });
        }
        Some(DayRow {
            date,
            occurrences,
            balance_after: self.balance,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.days {
            Some(days) => days.size_hint(),
            None => (0, Some(0)),
        }
    }
}

impl ExactSizeIterator for DailyProjection<'_> {}

/// Expands the transaction rules into a daily balance timeline.
///
/// An unset start date means the projection is not configured yet and the
/// iterator is empty.
pub fn project_daily<'a>(
    start_date: Option<NaiveDate>,
    opening_balance: Decimal,
    transactions: &'a [Transaction],
    horizon_months: u32,
) -> DailyProjection<'a> {
    let Some(start) = start_date else {
        return DailyProjection::empty(transactions, opening_balance);
    };
    let Some(end) = add_months(start, horizon_months) else {
        tracing::warn!(%start, horizon_months, "projection end date is out of range");
        return DailyProjection::empty(transactions, opening_balance);
    };
    DailyProjection {
        days: Some(DateRange::inclusive(start, end)),
        transactions,
        balance: opening_balance,
    }
}

/// Locates the row for `date` in rows produced by [`project_daily`].
pub fn find_day(rows: &[DayRow], date: NaiveDate) -> Option<&DayRow> {
    rows.binary_search_by_key(&date, |row| row.date)
        .ok()
        .map(|idx| &rows[idx])
}

/// Headline figures over a computed projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionSummary {
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub days: usize,
    pub occurrences: usize,
    pub closing_balance: Decimal,
    pub lowest_balance: Decimal,
    pub lowest_balance_date: NaiveDate,
    pub first_overdraft: Option<NaiveDate>,
}

impl ProjectionSummary {
    /// Returns `None` for an empty projection.
    pub fn from_rows(rows: &[DayRow]) -> Option<Self> {
        let first = rows.first()?;
        let last = rows.last()?;
        let mut lowest = first;
        let mut first_overdraft = None;
        let mut occurrences = 0usize;
        for row in rows {
            occurrences += row.occurrences.len();
            if row.balance_after < lowest.balance_after {
                lowest = row;
            }
            if first_overdraft.is_none() && row.balance_after < Decimal::ZERO {
                first_overdraft = Some(row.date);
            }
        }
        Some(Self {
            first_date: first.date,
            last_date: last.date,
            days: rows.len(),
            occurrences,
            closing_balance: last.balance_after,
            lowest_balance: lowest.balance_after,
            lowest_balance_date: lowest.date,
            first_overdraft,
        })
    }
}
