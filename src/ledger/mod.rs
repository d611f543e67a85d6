//! Ledger domain models and the projection engine.

pub mod balance;
pub mod calendar;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod projection;
pub mod recurrence;
pub mod transaction;

pub use balance::{compute_ledger, LedgerEntry, LedgerTotals, RunningLedger};
pub use ledger::{Ledger, ProjectionSettings, CURRENT_SCHEMA_VERSION};
pub use projection::{
    find_day, project_daily, DailyProjection, DayRow, Occurrence, ProjectionSummary,
    DEFAULT_HORIZON_MONTHS,
};
pub use transaction::{Frequency, Transaction, TransactionDraft, TransactionKind};
