pub mod json_backend;

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use chrono::Datelike;

use crate::{
    errors::LedgerError,
    ledger::{Frequency, Ledger},
};

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Abstraction over persistence backends that hold the whole ledger document.
pub trait StorageBackend: Send + Sync {
    /// Loads the stored document, or `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Ledger>>;
    /// Replaces the stored document with `ledger`.
    fn save(&self, ledger: &Ledger) -> Result<()>;
    fn path(&self) -> &Path;
    fn list_backups(&self) -> Result<Vec<PathBuf>>;
    /// Moves a document that cannot be loaded out of the way so the next
    /// save starts fresh. Returns where it went, or `None` if there was nothing to move.
    fn quarantine(&self) -> Result<Option<PathBuf>>;
}

pub use json_backend::{load_ledger_from_path, save_ledger_to_path, JsonStorage};

/// Flags entries that load fine but will behave surprisingly in a projection.
pub fn ledger_warnings(ledger: &Ledger) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut warnings = Vec::new();
    for txn in &ledger.transactions {
        if !seen.insert(txn.id) {
            warnings.push(format!("transaction id {} appears more than once", txn.id));
        }
        if txn.frequency == Frequency::Monthly && txn.date.day() > 28 {
            warnings.push(format!(
                "monthly `{}` is anchored on day {} and skips shorter months",
                txn.description,
                txn.date.day()
            ));
        }
        if let Some(start) = ledger.settings.start_date {
            if txn.frequency == Frequency::Irregular && txn.date < start {
                warnings.push(format!(
                    "`{}` on {} is before the projection start {}",
                    txn.description, txn.date, start
                ));
            }
        }
    }
    warnings
}
