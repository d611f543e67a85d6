use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::calendar::parse_iso_date;
use crate::errors::ValidationError;

/// Largest accepted amount (one trillion). Keeps running sums far from
/// `Decimal`'s limits.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// A single income or expense rule entered by the user.
///
/// For [`Frequency::Irregular`] the `date` is the one day the transaction
/// happens. For recurring frequencies it is the anchor that fixes both the
/// first occurrence and the phase of every later one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub id: Uuid,
    pub description: String,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub frequency: Frequency,
    pub date: NaiveDate,
}

impl Transaction {
    /// Builds a transaction, enforcing the same rules as [`TransactionDraft::validate`].
    pub fn new(
        description: impl Into<String>,
        kind: TransactionKind,
        amount: Decimal,
        frequency: Frequency,
        date: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let description = description.into().trim().to_string();
        if description.is_empty() {
            return Err(ValidationError::MissingDescription);
        }
        if amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount);
        }
        if amount > MAX_AMOUNT {
            return Err(ValidationError::AmountTooLarge(amount.to_string()));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            description,
            kind,
            amount,
            frequency,
            date,
        })
    }

    /// Amount with the sign implied by `kind`.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }

    /// Returns `balance` after this transaction is applied.
    ///
    /// Saturates at `Decimal::MAX`/`Decimal::MIN`; a stored document can hold
    /// amounts that never went through validation.
    pub fn apply_to(&self, balance: Decimal) -> Decimal {
        balance.saturating_add(self.signed_amount())
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self.frequency, Frequency::Irregular)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        };
        f.write_str(label)
    }
}

impl FromStr for TransactionKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" | "in" => Ok(TransactionKind::Income),
            "expense" | "out" => Ok(TransactionKind::Expense),
            other => Err(ValidationError::InvalidKind(other.to_string())),
        }
    }
}

/// How often a transaction repeats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    /// Happens once, on its recorded date.
    Irregular,
    /// Same day-of-month as the anchor, every month from the anchor onwards.
    Monthly,
    /// Every 28 days from the anchor onwards.
    FourWeekly,
}

impl Frequency {
    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Irregular => "One-off",
            Frequency::Monthly => "Monthly",
            Frequency::FourWeekly => "Every 4 weeks",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Frequency::Irregular => "irregular",
            Frequency::Monthly => "monthly",
            Frequency::FourWeekly => "four-weekly",
        };
        f.write_str(label)
    }
}

impl FromStr for Frequency {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "irregular" | "one-off" | "once" => Ok(Frequency::Irregular),
            "monthly" => Ok(Frequency::Monthly),
            "four-weekly" | "4-weekly" | "fourweekly" => Ok(Frequency::FourWeekly),
            _ => Err(ValidationError::InvalidFrequency(value.trim().to_string())),
        }
    }
}

/// Raw, unvalidated transaction fields as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct TransactionDraft {
    pub description: String,
    pub kind: String,
    pub amount: String,
    pub frequency: String,
    pub date: String,
}

impl TransactionDraft {
    /// Validates every field and produces a transaction with a fresh id.
    pub fn validate(&self) -> Result<Transaction, ValidationError> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingDescription);
        }
        let amount_text = self.amount.trim();
        let amount = Decimal::from_str(amount_text)
            .map_err(|_| ValidationError::InvalidAmount(amount_text.to_string()))?;
        let date_text = self.date.trim();
        if date_text.is_empty() {
            return Err(ValidationError::MissingDate);
        }
        let date = parse_iso_date(date_text)?;
        let kind = self.kind.parse::<TransactionKind>()?;
        let frequency = if self.frequency.trim().is_empty() {
            Frequency::Irregular
        } else {
            self.frequency.parse::<Frequency>()?
        };
        Transaction::new(self.description.as_str(), kind, amount, frequency, date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn draft() -> TransactionDraft {
        TransactionDraft {
            description: "  Rent ".into(),
            kind: "Expense".into(),
            amount: "950.00".into(),
            frequency: "monthly".into(),
            date: "2024-01-01".into(),
        }
    }

    #[test]
    fn draft_validates_into_transaction() {
        let txn = draft().validate().expect("valid draft");
        assert_eq!(txn.description, "Rent");
        assert_eq!(txn.kind, TransactionKind::Expense);
        assert_eq!(txn.amount, dec!(950.00));
        assert_eq!(txn.frequency, Frequency::Monthly);
        assert_eq!(txn.signed_amount(), dec!(-950.00));
    }

    #[test]
    fn draft_rejects_blank_description() {
        let mut input = draft();
        input.description = "   ".into();
        assert_eq!(input.validate(), Err(ValidationError::MissingDescription));
    }

    #[test]
    fn draft_rejects_non_numeric_amount() {
        let mut input = draft();
        input.amount = "12,5x".into();
        assert_eq!(
            input.validate(),
            Err(ValidationError::InvalidAmount("12,5x".into()))
        );
    }

    #[test]
    fn draft_rejects_zero_amount() {
        let mut input = draft();
        input.amount = "0".into();
        assert_eq!(input.validate(), Err(ValidationError::NonPositiveAmount));
    }

    #[test]
    fn draft_rejects_amount_above_cap() {
        let mut input = draft();
        input.amount = "79228162514264337593543950335".into();
        assert_eq!(
            input.validate(),
            Err(ValidationError::AmountTooLarge(
                "79228162514264337593543950335".into()
            ))
        );

        input.amount = "1000000000000".into();
        assert_eq!(input.validate().map(|txn| txn.amount), Ok(MAX_AMOUNT));
    }

    #[test]
    fn applying_saturates_instead_of_overflowing() {
        let mut txn = draft().validate().unwrap();
        txn.amount = Decimal::MAX;
        assert_eq!(txn.apply_to(dec!(-1)), Decimal::MIN);
        txn.kind = TransactionKind::Income;
        assert_eq!(txn.apply_to(dec!(1)), Decimal::MAX);
    }

    #[test]
    fn draft_requires_date() {
        let mut input = draft();
        input.date = String::new();
        assert_eq!(input.validate(), Err(ValidationError::MissingDate));
    }

    #[test]
    fn frequency_accepts_aliases() {
        assert_eq!("four_weekly".parse::<Frequency>(), Ok(Frequency::FourWeekly));
        assert_eq!("4-weekly".parse::<Frequency>(), Ok(Frequency::FourWeekly));
        assert_eq!("One-Off".parse::<Frequency>(), Ok(Frequency::Irregular));
        assert!("weekly".parse::<Frequency>().is_err());
    }

    #[test]
    fn each_transaction_gets_its_own_id() {
        let a = draft().validate().unwrap();
        let b = draft().validate().unwrap();
        assert_ne!(a.id, b.id);
    }
}
