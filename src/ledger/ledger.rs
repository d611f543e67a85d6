use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{calendar::parse_iso_date, transaction::Transaction};
use crate::errors::ValidationError;

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Start date and opening balance that seed every computation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectionSettings {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub opening_balance: Decimal,
}

impl ProjectionSettings {
    pub fn new(start_date: Option<NaiveDate>, opening_balance: Decimal) -> Self {
        Self {
            start_date,
            opening_balance,
        }
    }

    /// Builds settings from raw user text.
    ///
    /// A blank start date leaves the projection unconfigured. A malformed one
    /// is rejected. An opening balance that is blank or not a number falls
    /// back to zero.
    pub fn from_inputs(start_date: &str, opening_balance: &str) -> Result<Self, ValidationError> {
        let start_date = if start_date.trim().is_empty() {
            None
        } else {
            Some(parse_iso_date(start_date)?)
        };
        let opening_text = opening_balance.trim();
        let opening_balance = if opening_text.is_empty() {
            Decimal::ZERO
        } else {
            Decimal::from_str(opening_text).unwrap_or_else(|_| {
                tracing::warn!(
                    value = opening_text,
                    "opening balance is not a number; using zero"
                );
                Decimal::ZERO
            })
        };
        Ok(Self::new(start_date, opening_balance))
    }

    pub fn is_configured(&self) -> bool {
        self.start_date.is_some()
    }
}

/// The persisted document: settings plus the transaction set in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub settings: ProjectionSettings,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(ProjectionSettings::default())
    }
}

impl Ledger {
    pub fn new(settings: ProjectionSettings) -> Self {
        Self {
            settings,
            transactions: Vec::new(),
            updated_at: Utc::now(),
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn add_transaction(&mut self, transaction: Transaction) -> Uuid {
        let id = transaction.id;
        self.transactions.push(transaction);
        self.touch();
        id
    }

    pub fn remove_transaction(&mut self, id: Uuid) -> Option<Transaction> {
        let idx = self.transactions.iter().position(|txn| txn.id == id)?;
        let removed = self.transactions.remove(idx);
        self.touch();
        Some(removed)
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn set_settings(&mut self, settings: ProjectionSettings) {
        self.settings = settings;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
