mod common;

use std::fs;

use budget_projection::{
    errors::LedgerError,
    ledger::{Frequency, Ledger, ProjectionSettings, TransactionKind},
    storage::{load_ledger_from_path, save_ledger_to_path, JsonStorage, StorageBackend},
};
use common::{date, txn};
use rust_decimal_macros::dec;
use tempfile::TempDir;

#[test]
fn decimal_amounts_round_trip_exactly() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("ledger.json");
    let mut ledger = Ledger::new(ProjectionSettings::new(Some(date("2024-01-01")), dec!(0.1)));
    ledger.add_transaction(txn(
        "Tea",
        TransactionKind::Expense,
        dec!(0.2),
        Frequency::Irregular,
        "2024-01-02",
    ));
    save_ledger_to_path(&ledger, &path).unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"0.2\""));

    let loaded = load_ledger_from_path(&path).unwrap();
    assert_eq!(loaded.settings.opening_balance, dec!(0.1));
    assert_eq!(loaded.transactions, ledger.transactions);
}

#[test]
fn corrupt_document_reports_a_serde_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("ledger.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        load_ledger_from_path(&path),
        Err(LedgerError::Serde(_))
    ));
}

#[test]
fn missing_fields_take_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("ledger.json");
    fs::write(&path, "{}").unwrap();
    let ledger = load_ledger_from_path(&path).unwrap();
    assert!(ledger.transactions.is_empty());
    assert!(ledger.settings.start_date.is_none());
}

#[test]
fn backups_are_pruned_to_retention() {
    let temp = TempDir::new().unwrap();
    let storage = JsonStorage::new(temp.path().join("ledger.json"), Some(1)).unwrap();
    for _ in 0..3 {
        storage.save(&Ledger::default()).unwrap();
    }
    let backups = storage.list_backups().unwrap();
    assert_eq!(backups.len(), 1);
    assert!(backups[0].starts_with(storage.backups_dir()));
    assert!(storage.load().unwrap().is_some());
}
