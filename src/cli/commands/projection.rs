use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::table::{Table, TableColumn};
use crate::ledger::DayRow;

use super::{balance_cell, money, parse_date_arg, usage_error, CommandDefinition};

const DESCRIPTION_WIDTH: usize = 32;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "project",
            "Show the day-by-day balance projection",
            "project [days]",
            cmd_project,
        ),
        CommandDefinition::new(
            "find",
            "Show the projected day for a date",
            "find <YYYY-MM-DD>",
            cmd_find,
        ),
    ]
}

fn cmd_project(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let limit = match args {
        [] => None,
        [days] => Some(days.parse::<usize>().map_err(|_| {
            CommandError::InvalidArguments(format!("`{days}` is not a number of days"))
        })?),
        _ => return Err(usage_error("project [days]")),
    };
    let days = &context.session.snapshot().days;
    if !context.session.settings().is_configured() {
        output::warning("No start date set. Use `config <YYYY-MM-DD> <opening-balance>` first.");
        return Ok(());
    }
    if days.is_empty() {
        output::warning(format!(
            "A horizon of {} months from the start date runs past the supported calendar; \
             lower `horizon_months` in config.json.",
            context.session.horizon_months()
        ));
        return Ok(());
    }
    let shown = limit.unwrap_or(days.len()).min(days.len());
    output::section(format!(
        "Projection from {} ({} of {} days)",
        days[0].date,
        shown,
        days.len()
    ));
    println!("{}", render_days(&days[..shown]));
    Ok(())
}

fn cmd_find(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [date] = args else {
        return Err(usage_error("find <YYYY-MM-DD>"));
    };
    let date = parse_date_arg(date)?;
    match context.session.find_date(date) {
        Some(row) => {
            output::section(format!("Projection for {date}"));
            println!("{}", render_days(std::slice::from_ref(row)));
            if !row.is_empty() {
                output::info(format!("Net change: {}", money(row.net_change())));
            }
        }
        None => output::warning(format!("{date} is not inside the projected horizon.")),
    }
    Ok(())
}

/// One line per occurrence, or a single carried-forward line for a quiet day.
fn render_days(days: &[DayRow]) -> String {
    let mut table = Table::new(vec![
        TableColumn::left("Date"),
        TableColumn::left("Description").max_width(DESCRIPTION_WIDTH),
        TableColumn::right("Amount"),
        TableColumn::right("Balance"),
    ]);
    for day in days {
        if day.is_empty() {
            table.push(vec![
                day.date.to_string(),
                String::new(),
                String::new(),
                balance_cell(day.balance_after),
            ]);
            continue;
        }
        for occurrence in &day.occurrences {
            table.push(vec![
                day.date.to_string(),
                occurrence.transaction.description.clone(),
                money(occurrence.transaction.signed_amount()),
                balance_cell(occurrence.balance_after),
            ]);
        }
    }
    table.render()
}
