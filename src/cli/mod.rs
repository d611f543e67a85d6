pub mod commands;
pub mod core;
pub mod output;
mod shell;
pub mod table;

pub use shell::{run_cli, SCRIPT_MODE_ENV};
