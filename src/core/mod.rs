//! Session orchestration on top of the ledger engine and storage.

pub mod session;

pub use session::{Session, Snapshot};
