use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::output;

use super::{money, usage_error, CommandDefinition};

const USAGE: &str = "config [<YYYY-MM-DD|-> [opening-balance]]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "config",
        "Show or set the projection start date and opening balance",
        USAGE,
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => {}
        [start] => context.session.configure(blank_dash(start), "")?,
        [start, opening] => context.session.configure(blank_dash(start), opening)?,
        _ => return Err(usage_error(USAGE)),
    }
    if !args.is_empty() {
        output::success("Settings saved.");
    }

    let settings = context.session.settings();
    output::section("Settings");
    match settings.start_date {
        Some(date) => output::info(format!("Start date     : {date}")),
        None => output::info("Start date     : not set"),
    }
    output::info(format!(
        "Opening balance: {}",
        money(settings.opening_balance)
    ));
    output::info(format!(
        "Horizon        : {} months",
        context.session.horizon_months()
    ));
    output::info(format!(
        "Ledger file    : {}",
        context.session.storage().path().display()
    ));
    Ok(())
}

/// `-` clears the start date.
fn blank_dash(value: &str) -> &str {
    if value.trim() == "-" {
        ""
    } else {
        value
    }
}
