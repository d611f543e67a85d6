#![allow(dead_code)]

use budget_projection::{
    core::Session,
    ledger::{Frequency, Transaction, TransactionKind, DEFAULT_HORIZON_MONTHS},
    storage::JsonStorage,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tempfile::TempDir;

/// Opens a session backed by a JSON document in a fresh temp directory.
///
/// The returned guard must outlive the session.
pub fn setup_session() -> (Session, TempDir) {
    let temp = TempDir::new().expect("create temp dir");
    let session = open_in(&temp);
    (session, temp)
}

/// Reopens the document stored in `temp`, as a restarted program would.
pub fn open_in(temp: &TempDir) -> Session {
    let storage =
        JsonStorage::new(temp.path().join("ledger.json"), Some(3)).expect("create json storage");
    Session::open(Box::new(storage), DEFAULT_HORIZON_MONTHS).expect("open session")
}

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid test date")
}

pub fn txn(
    description: &str,
    kind: TransactionKind,
    amount: Decimal,
    frequency: Frequency,
    on: &str,
) -> Transaction {
    Transaction::new(description, kind, amount, frequency, date(on)).expect("valid transaction")
}
