use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    errors::{LedgerError, Result},
    ledger::{
        compute_ledger, find_day, project_daily, DayRow, Ledger, ProjectionSettings,
        ProjectionSummary, RunningLedger, Transaction, TransactionDraft,
    },
    storage::{ledger_warnings, StorageBackend},
};

/// Result of the last recompute. Rendering reads only from here.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub ledger: RunningLedger,
    pub days: Vec<DayRow>,
}

impl Snapshot {
    pub fn summary(&self) -> Option<ProjectionSummary> {
        ProjectionSummary::from_rows(&self.days)
    }
}

/// Owns the transaction set, its storage and the derived views.
///
/// Every successful mutation saves the whole document and then recomputes
/// the snapshot exactly once. A rejected mutation changes nothing.
pub struct Session {
    ledger: Ledger,
    storage: Box<dyn StorageBackend>,
    horizon_months: u32,
    snapshot: Snapshot,
    warnings: Vec<String>,
}

impl Session {
    /// Loads the stored document (an empty ledger when there is none yet).
    ///
    /// A document that cannot be parsed, or was written by a newer schema, is
    /// moved aside and the session starts empty with a warning. I/O failures
    /// are still returned.
    pub fn open(storage: Box<dyn StorageBackend>, horizon_months: u32) -> Result<Self> {
        let mut warnings = Vec::new();
        let ledger = match storage.load() {
            Ok(document) => document.unwrap_or_default(),
            Err(err @ (LedgerError::Serde(_) | LedgerError::UnsupportedSchema(_))) => {
                let notice = match storage.quarantine()? {
                    Some(moved) => format!(
                        "ledger document could not be read ({err}); moved to {} and started empty",
                        moved.display()
                    ),
                    None => format!("ledger document could not be read ({err}); started empty"),
                };
                warnings.push(notice);
                Ledger::default()
            }
            Err(err) => return Err(err),
        };
        warnings.extend(ledger_warnings(&ledger));
        for warning in &warnings {
            tracing::warn!("{warning}");
        }
        tracing::info!(
            path = %storage.path().display(),
            transactions = ledger.transactions.len(),
            "ledger opened"
        );
        let mut session = Self {
            ledger,
            storage,
            horizon_months,
            snapshot: Snapshot::default(),
            warnings,
        };
        session.recompute();
        Ok(session)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn settings(&self) -> &ProjectionSettings {
        &self.ledger.settings
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn horizon_months(&self) -> u32 {
        self.horizon_months
    }

    /// Warnings found when the document was opened.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.storage.as_ref()
    }

    pub fn add_transaction(&mut self, draft: &TransactionDraft) -> Result<Uuid> {
        let transaction = draft.validate()?;
        self.insert(transaction)
    }

    /// Adds an already validated transaction.
    pub fn insert(&mut self, transaction: Transaction) -> Result<Uuid> {
        let mut next = self.ledger.clone();
        let id = next.add_transaction(transaction);
        self.commit(next)?;
        tracing::info!(%id, "transaction added");
        Ok(id)
    }

    pub fn delete_transaction(&mut self, id: Uuid) -> Result<Transaction> {
        let mut next = self.ledger.clone();
        let removed = next
            .remove_transaction(id)
            .ok_or(LedgerError::TransactionNotFound(id))?;
        self.commit(next)?;
        tracing::info!(%id, description = %removed.description, "transaction deleted");
        Ok(removed)
    }

    /// Deletes the transaction shown at `row` (0-based) of the current ledger view.
    pub fn delete_row(&mut self, row: usize) -> Result<Transaction> {
        let id = self
            .snapshot
            .ledger
            .id_at(row)
            .ok_or(LedgerError::RowOutOfRange(row))?;
        self.delete_transaction(id)
    }

    /// Replaces the start date and opening balance from raw user text.
    pub fn configure(&mut self, start_date: &str, opening_balance: &str) -> Result<()> {
        let settings = ProjectionSettings::from_inputs(start_date, opening_balance)?;
        self.set_settings(settings)
    }

    pub fn set_settings(&mut self, settings: ProjectionSettings) -> Result<()> {
        let mut next = self.ledger.clone();
        next.set_settings(settings);
        self.commit(next)?;
        tracing::info!(
            start_date = ?self.ledger.settings.start_date,
            opening_balance = %self.ledger.settings.opening_balance,
            "projection settings saved"
        );
        Ok(())
    }

    /// Rebuilds the ledger view and daily projection from current state.
    pub fn recompute(&mut self) {
        let settings = &self.ledger.settings;
        let transactions = &self.ledger.transactions;
        let ledger = compute_ledger(settings.opening_balance, transactions);
        let days: Vec<DayRow> = project_daily(
            settings.start_date,
            settings.opening_balance,
            transactions,
            self.horizon_months,
        )
        .collect();
        tracing::debug!(
            entries = ledger.len(),
            days = days.len(),
            "recomputed ledger and projection"
        );
        self.snapshot = Snapshot { ledger, days };
    }

    /// The projected day for `date`, if it falls inside the horizon.
    pub fn find_date(&self, date: NaiveDate) -> Option<&DayRow> {
        find_day(&self.snapshot.days, date)
    }

    fn commit(&mut self, next: Ledger) -> Result<()> {
        self.storage.save(&next)?;
        self.ledger = next;
        self.recompute();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        path::{Path, PathBuf},
        sync::{Arc, Mutex},
    };

    use super::*;
    use crate::storage;

    /// In-memory backend that can be told to fail.
    #[derive(Clone, Default)]
    struct MemoryStorage {
        document: Arc<Mutex<Option<Ledger>>>,
        fail_saves: Arc<Mutex<bool>>,
        unreadable: Arc<Mutex<bool>>,
        path: PathBuf,
    }

    impl StorageBackend for MemoryStorage {
        fn load(&self) -> storage::Result<Option<Ledger>> {
            if *self.unreadable.lock().unwrap() {
                return Err(LedgerError::UnsupportedSchema(9));
            }
            Ok(self.document.lock().unwrap().clone())
        }

        fn save(&self, ledger: &Ledger) -> storage::Result<()> {
            if *self.fail_saves.lock().unwrap() {
                return Err(LedgerError::Persistence("disk full".into()));
            }
            *self.document.lock().unwrap() = Some(ledger.clone());
            Ok(())
        }

        fn path(&self) -> &Path {
            &self.path
        }

        fn list_backups(&self) -> storage::Result<Vec<PathBuf>> {
            Ok(Vec::new())
        }

        fn quarantine(&self) -> storage::Result<Option<PathBuf>> {
            *self.unreadable.lock().unwrap() = false;
            Ok(self
                .document
                .lock()
                .unwrap()
                .take()
                .map(|_| PathBuf::from("aside.json")))
        }
    }

    fn draft(description: &str, date: &str) -> TransactionDraft {
        TransactionDraft {
            description: description.into(),
            kind: "expense".into(),
            amount: "10".into(),
            frequency: "irregular".into(),
            date: date.into(),
        }
    }

    #[test]
    fn failed_save_leaves_state_untouched() {
        let backend = MemoryStorage::default();
        let mut session = Session::open(Box::new(backend.clone()), 1).expect("open");
        session.add_transaction(&draft("kept", "2024-01-02")).unwrap();

        *backend.fail_saves.lock().unwrap() = true;
        let err = session.add_transaction(&draft("lost", "2024-01-03"));
        assert!(matches!(err, Err(LedgerError::Persistence(_))));
        assert_eq!(session.ledger().transaction_count(), 1);
        assert_eq!(session.snapshot().ledger.len(), 1);
    }

    #[test]
    fn invalid_draft_is_not_saved() {
        let backend = MemoryStorage::default();
        let mut session = Session::open(Box::new(backend.clone()), 1).expect("open");
        let err = session.add_transaction(&draft("", "2024-01-02"));
        assert!(matches!(err, Err(LedgerError::Validation(_))));
        assert!(backend.document.lock().unwrap().is_none());
    }

    #[test]
    fn delete_row_out_of_range() {
        let mut session = Session::open(Box::new(MemoryStorage::default()), 1).expect("open");
        assert!(matches!(
            session.delete_row(0),
            Err(LedgerError::RowOutOfRange(0))
        ));
    }

    #[test]
    fn unreadable_document_opens_empty_with_warning() {
        let backend = MemoryStorage::default();
        *backend.document.lock().unwrap() = Some(Ledger::default());
        *backend.unreadable.lock().unwrap() = true;

        let session = Session::open(Box::new(backend.clone()), 1).expect("open");
        assert_eq!(session.ledger().transaction_count(), 0);
        assert_eq!(session.warnings().len(), 1);
        assert!(session.warnings()[0].contains("aside.json"));
        assert!(backend.document.lock().unwrap().is_none());
    }

    #[test]
    fn oversized_amount_is_rejected_before_saving() {
        let backend = MemoryStorage::default();
        let mut session = Session::open(Box::new(backend.clone()), 24).expect("open");
        session.configure("2024-01-01", "0").unwrap();
        let mut huge = draft("lottery", "2024-01-05");
        huge.amount = "79228162514264337593543950335".into();
        huge.frequency = "monthly".into();
        let err = session.add_transaction(&huge);
        assert!(matches!(
            err,
            Err(LedgerError::Validation(
                crate::errors::ValidationError::AmountTooLarge(_)
            ))
        ));
        let stored = backend.document.lock().unwrap().clone().expect("settings saved");
        assert!(stored.transactions.is_empty());
    }
}
