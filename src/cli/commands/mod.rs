pub mod config;
pub mod ledger;
pub mod projection;
pub mod system;
pub mod transaction;

use chrono::NaiveDate;
use colored::Colorize;
use rust_decimal::Decimal;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::ledger::calendar::parse_iso_date;

pub(crate) fn all_definitions() -> Vec<CommandDefinition> {
    let mut commands = Vec::new();
    commands.extend(transaction::definitions());
    commands.extend(ledger::definitions());
    commands.extend(projection::definitions());
    commands.extend(config::definitions());
    commands.extend(system::definitions());
    commands
}

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

#[derive(Clone)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandDefinition {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

pub(crate) fn usage_error(usage: &str) -> CommandError {
    CommandError::InvalidArguments(format!("usage: {usage}"))
}

pub(crate) fn parse_date_arg(value: &str) -> Result<NaiveDate, CommandError> {
    parse_iso_date(value).map_err(|err| CommandError::InvalidArguments(err.to_string()))
}

/// Parses a 1-based row number as displayed in tables.
pub(crate) fn parse_row_arg(value: &str) -> Result<usize, CommandError> {
    match value.trim().parse::<usize>() {
        Ok(row) if row >= 1 => Ok(row - 1),
        _ => Err(CommandError::InvalidArguments(format!(
            "`{value}` is not a row number"
        ))),
    }
}

pub(crate) fn money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

/// Balance cell, red when overdrawn.
pub(crate) fn balance_cell(value: Decimal) -> String {
    let text = money(value);
    if value < Decimal::ZERO {
        text.red().to_string()
    } else {
        text
    }
}
