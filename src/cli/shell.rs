//! Line-driven front end: a readline prompt for people, plain stdin for scripts.

use std::{
    borrow::Cow,
    io::{self, BufRead, Lines, StdinLock},
};

use colored::Colorize;
use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};

use crate::cli::core::{CliError, CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::output;
use crate::ledger::{Frequency, TransactionKind};

/// Environment variable that switches the shell to line-by-line stdin mode.
pub const SCRIPT_MODE_ENV: &str = "BUDGET_PROJECTION_CLI_SCRIPT";

const SCRIPT_COMMENT: char = '#';

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_MODE_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;
    for warning in context.session.warnings() {
        output::warning(warning);
    }

    match mode {
        CliMode::Interactive => {
            let mut input = PromptInput::new(&context)?;
            drive(&mut context, &mut input)
        }
        CliMode::Script => drive(&mut context, &mut ScriptInput::new()),
    }
}

/// Where shell lines come from.
trait LineSource {
    /// The next raw line, or `None` once input is exhausted.
    fn next_line(&mut self, context: &ShellContext) -> Result<Option<String>, CliError>;

    fn remember(&mut self, _line: &str) {}
}

fn drive(context: &mut ShellContext, input: &mut impl LineSource) -> Result<(), CliError> {
    while context.running {
        let Some(line) = input.next_line(context)? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() || line.starts_with(SCRIPT_COMMENT) {
            continue;
        }
        input.remember(line);
        match execute(context, line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => context.running = false,
            Err(err) => context.report_error(err),
        }
    }
    Ok(())
}

/// Tokenises one line and runs the matching command.
fn execute(context: &mut ShellContext, line: &str) -> Result<LoopControl, CommandError> {
    let tokens = match shell_words::split(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            output::warning(format!("Could not parse input: {err}"));
            return Ok(LoopControl::Continue);
        }
    };
    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();
    context.dispatch(&raw.to_lowercase(), raw, &args)
}

struct PromptInput {
    editor: Editor<ShellHelper, DefaultHistory>,
}

impl PromptInput {
    fn new(context: &ShellContext) -> Result<Self, CliError> {
        let mut editor = Editor::<ShellHelper, DefaultHistory>::new()?;
        editor.set_helper(Some(ShellHelper::from_context(context)));
        editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
        Ok(Self { editor })
    }
}

impl LineSource for PromptInput {
    fn next_line(&mut self, context: &ShellContext) -> Result<Option<String>, CliError> {
        if let Some(helper) = self.editor.helper_mut() {
            helper.rows = context.session.snapshot().ledger.len();
        }
        loop {
            match self.editor.readline(&context.prompt()) {
                Ok(line) => return Ok(Some(line)),
                Err(ReadlineError::Interrupted) => {
                    output::hint("Type `exit` to leave the shell.");
                }
                Err(ReadlineError::Eof) => {
                    output::info("Exiting shell.");
                    return Ok(None);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn remember(&mut self, line: &str) {
        self.editor.add_history_entry(line).ok();
    }
}

struct ScriptInput {
    lines: Lines<StdinLock<'static>>,
}

impl ScriptInput {
    fn new() -> Self {
        Self {
            lines: io::stdin().lock().lines(),
        }
    }
}

impl LineSource for ScriptInput {
    fn next_line(&mut self, _context: &ShellContext) -> Result<Option<String>, CliError> {
        Ok(self.lines.next().transpose()?)
    }
}

/// Completion and usage hints aware of what each command expects.
///
/// `add` completes kinds and frequencies in their argument slots, `delete`
/// and `upcoming` complete the ledger row numbers currently shown.
struct ShellHelper {
    commands: Vec<(&'static str, &'static str)>,
    rows: usize,
}

impl ShellHelper {
    fn from_context(context: &ShellContext) -> Self {
        let commands = context
            .registry
            .iter()
            .map(|entry| (entry.name, entry.usage))
            .collect();
        Self::new(commands, context.session.snapshot().ledger.len())
    }

    fn new(mut commands: Vec<(&'static str, &'static str)>, rows: usize) -> Self {
        commands.sort_unstable();
        commands.dedup_by_key(|(name, _)| *name);
        Self { commands, rows }
    }

    /// Values that fit the word at `position` (0 is the command itself).
    fn candidates(&self, command: &str, position: usize) -> Vec<String> {
        match (command, position) {
            (_, 0) | ("help", 1) => self
                .commands
                .iter()
                .map(|(name, _)| name.to_string())
                .collect(),
            ("add", 1) => [TransactionKind::Income, TransactionKind::Expense]
                .iter()
                .map(ToString::to_string)
                .collect(),
            ("add", 3) => [Frequency::Irregular, Frequency::Monthly, Frequency::FourWeekly]
                .iter()
                .map(ToString::to_string)
                .collect(),
            ("delete" | "upcoming", 1) => (1..=self.rows).map(|row| row.to_string()).collect(),
            _ => Vec::new(),
        }
    }

    fn completions(&self, line: &str, pos: usize) -> (usize, Vec<String>) {
        let prefix = &line[..pos];
        let start = prefix
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let words: Vec<&str> = prefix[..start].split_whitespace().collect();
        let command = words
            .first()
            .map(|word| word.to_ascii_lowercase())
            .unwrap_or_default();
        let needle = prefix[start..].to_ascii_lowercase();
        let matches = self
            .candidates(&command, words.len())
            .into_iter()
            .filter(|candidate| candidate.starts_with(&needle))
            .collect();
        (start, matches)
    }

    /// Remaining usage text once a known command and a space have been typed.
    fn usage_hint(&self, line: &str, pos: usize) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        let typed = line.strip_suffix(' ')?.trim_start().to_ascii_lowercase();
        let (name, usage) = self.commands.iter().find(|(name, _)| *name == typed)?;
        let rest = usage.strip_prefix(name)?.trim_start();
        (!rest.is_empty()).then(|| rest.to_string())
    }
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, matches) = self.completions(line, pos);
        let pairs = matches
            .into_iter()
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &ReadlineContext<'_>) -> Option<String> {
        self.usage_hint(line, pos)
    }
}

impl Highlighter for ShellHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(hint.dimmed().to_string())
    }
}

impl Validator for ShellHelper {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::Session, ledger::DEFAULT_HORIZON_MONTHS, storage::JsonStorage};
    use tempfile::TempDir;

    fn helper(rows: usize) -> ShellHelper {
        ShellHelper::new(
            vec![
                ("upcoming", "upcoming <row> [months]"),
                ("add", "add <income|expense> <amount>"),
                ("delete", "delete <row>"),
                ("help", "help [command]"),
            ],
            rows,
        )
    }

    fn context(temp: &TempDir) -> ShellContext {
        let storage = JsonStorage::new(temp.path().join("ledger.json"), None).unwrap();
        let session = Session::open(Box::new(storage), DEFAULT_HORIZON_MONTHS).unwrap();
        ShellContext::with_session(CliMode::Script, session)
    }

    #[test]
    fn first_word_completes_command_names() {
        let (start, matches) = helper(0).completions("u", 1);
        assert_eq!(start, 0);
        assert_eq!(matches, vec!["upcoming"]);
    }

    #[test]
    fn add_completes_kind_then_frequency() {
        let helper = helper(0);
        assert_eq!(helper.completions("add exp", 7), (4, vec!["expense".to_string()]));
        let line = "add income 12 four";
        assert_eq!(
            helper.completions(line, line.len()),
            (14, vec!["four-weekly".to_string()])
        );
        assert!(helper.completions("add income ", 11).1.is_empty());
    }

    #[test]
    fn row_arguments_complete_current_rows() {
        let helper = helper(12);
        let (_, rows) = helper.completions("delete 1", 8);
        assert_eq!(rows, vec!["1", "10", "11", "12"]);
        assert!(helper.completions("upcoming 3 ", 11).1.is_empty());
    }

    #[test]
    fn usage_hint_follows_a_complete_command() {
        let helper = helper(0);
        assert_eq!(helper.usage_hint("delete ", 7), Some("<row>".to_string()));
        assert_eq!(helper.usage_hint("delete", 6), None);
        assert_eq!(helper.usage_hint("frobnicate ", 11), None);
    }

    #[test]
    fn quoted_description_reaches_the_ledger() {
        let temp = TempDir::new().unwrap();
        let mut context = context(&temp);
        let outcome = execute(
            &mut context,
            "add expense 12.50 monthly 2024-01-05 \"Gym membership\"",
        );
        assert!(matches!(outcome, Ok(LoopControl::Continue)));
        let stored = &context.session.ledger().transactions;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].description, "Gym membership");
    }

    #[test]
    fn unbalanced_quotes_change_nothing() {
        let temp = TempDir::new().unwrap();
        let mut context = context(&temp);
        let outcome = execute(&mut context, "add expense 3 irregular 2024-01-05 \"Lunch");
        assert!(matches!(outcome, Ok(LoopControl::Continue)));
        assert_eq!(context.session.ledger().transaction_count(), 0);
    }

    #[test]
    fn exit_stops_the_loop() {
        let temp = TempDir::new().unwrap();
        let mut context = context(&temp);
        assert!(matches!(execute(&mut context, "EXIT"), Ok(LoopControl::Exit)));
    }
}
