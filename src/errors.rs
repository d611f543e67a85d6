use thiserror::Error;
use uuid::Uuid;

/// Rejections raised while turning user input into ledger values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("description is required")]
    MissingDescription,
    #[error("amount `{0}` is not a number")]
    InvalidAmount(String),
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    #[error("amount `{0}` is larger than the supported maximum of 1000000000000")]
    AmountTooLarge(String),
    #[error("date is required")]
    MissingDate,
    #[error("date `{0}` is not a valid YYYY-MM-DD calendar date")]
    InvalidDate(String),
    #[error("unknown transaction kind `{0}` (expected income or expense)")]
    InvalidKind(String),
    #[error("unknown frequency `{0}` (expected irregular, monthly or four-weekly)")]
    InvalidFrequency(String),
}

/// Error type that captures common ledger failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),
    #[error("No ledger row {}", .0 + 1)]
    RowOutOfRange(usize),
    #[error("Ledger document uses schema version {0}, which is newer than this build supports")]
    UnsupportedSchema(u8),
    #[error("Persistence error: {0}")]
    Persistence(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
