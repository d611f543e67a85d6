#![doc(test(attr(deny(warnings))))]

//! Budget Projection turns a handful of income and expense rules into a
//! running ledger and a day-by-day balance forecast.
//!
//! The engine lives in [`ledger`]: [`ledger::compute_ledger`] produces the
//! date-ordered ledger with running balances and [`ledger::project_daily`]
//! expands one-off, monthly and four-weekly rules over the forecast horizon.
//! [`core::Session`] owns the state, persists it through a
//! [`storage::StorageBackend`] and recomputes after every change.

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Budget Projection tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
