//! Shell context, dispatch and CLI error types.

use std::io;

use rustyline::error::ReadlineError;
use strsim::levenshtein;
use thiserror::Error;

use crate::{
    config::{Config, ConfigError, ConfigManager},
    core::Session,
    errors::LedgerError,
    storage::JsonStorage,
    utils::paths,
};

use super::{
    commands::{self, CommandDefinition},
    output,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("exit requested")]
    ExitRequested,
}

/// Failures that end the shell.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Readline(#[from] ReadlineError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub struct ShellContext {
    pub mode: CliMode,
    pub running: bool,
    pub session: Session,
    pub registry: Vec<CommandDefinition>,
}

impl ShellContext {
    /// Loads config and the ledger document from the application data directory.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let base = paths::app_data_dir();
        let config = match ConfigManager::with_base_dir(&base)?.load() {
            Ok(config) => config,
            Err(ConfigError::Serde(message)) => {
                output::warning(format!(
                    "config.json could not be read ({message}); using defaults"
                ));
                Config::default()
            }
            Err(err) => return Err(err.into()),
        };
        output::set_color_enabled(config.ui_color_enabled && mode == CliMode::Interactive);
        let storage = JsonStorage::new(
            config.resolve_ledger_file(&base),
            Some(config.backup_retention),
        )?;
        let session = Session::open(Box::new(storage), config.horizon_months)?;
        Ok(Self::with_session(mode, session))
    }

    pub fn with_session(mode: CliMode, session: Session) -> Self {
        Self {
            mode,
            running: true,
            session,
            registry: commands::all_definitions(),
        }
    }

    pub fn prompt(&self) -> String {
        let count = self.session.ledger().transaction_count();
        format!("budget [{count}]> ")
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandDefinition> {
        self.registry.iter().find(|entry| entry.name == name)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let Some(handler) = self.command(command).map(|entry| entry.handler) else {
            self.suggest_command(raw);
            return Ok(LoopControl::Continue);
        };
        match handler(self, args) {
            Ok(()) => Ok(LoopControl::Continue),
            Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
            Err(err) => Err(err),
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));
        let best = self
            .registry
            .iter()
            .map(|entry| (levenshtein(entry.name, &input.to_lowercase()), entry.name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::hint(format!("Did you mean `{name}`?"));
            }
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
            }
            CommandError::Ledger(LedgerError::Validation(err)) => {
                output::error(format!("Transaction not saved: {err}"));
            }
            other => output::error(other),
        }
    }
}
