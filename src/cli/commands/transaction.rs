use chrono::{Datelike, NaiveDate};

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::table::{Table, TableColumn};
use crate::errors::LedgerError;
use crate::ledger::{calendar::add_months, recurrence, Frequency, TransactionDraft};

use super::{money, parse_row_arg, usage_error, CommandDefinition};

const ADD_USAGE: &str = "add <income|expense> <amount> <irregular|monthly|four-weekly> <YYYY-MM-DD> <description...>";
const DEFAULT_UPCOMING_MONTHS: u32 = 3;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("add", "Add an income or expense", ADD_USAGE, cmd_add),
        CommandDefinition::new(
            "delete",
            "Delete the transaction shown at a ledger row",
            "delete <row>",
            cmd_delete,
        ),
        CommandDefinition::new(
            "upcoming",
            "List the next dates a ledger row occurs on",
            "upcoming <row> [months]",
            cmd_upcoming,
        ),
    ]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 5 {
        return Err(usage_error(ADD_USAGE));
    }
    let draft = TransactionDraft {
        kind: args[0].to_string(),
        amount: args[1].to_string(),
        frequency: args[2].to_string(),
        date: args[3].to_string(),
        description: args[4..].join(" "),
    };
    let id = context.session.add_transaction(&draft)?;
    let Some(txn) = context.session.ledger().transaction(id) else {
        return Ok(());
    };
    let when = if txn.is_recurring() { "from" } else { "on" };
    output::success(format!(
        "Added {} `{}` of {} ({}) {} {}.",
        txn.kind,
        txn.description,
        money(txn.amount),
        txn.frequency.label(),
        when,
        txn.date
    ));
    if txn.frequency == Frequency::Monthly && txn.date.day() > 28 {
        output::warning(format!(
            "Monthly rules anchored on day {} do not occur in shorter months.",
            txn.date.day()
        ));
    }
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [row] = args else {
        return Err(usage_error("delete <row>"));
    };
    let row = parse_row_arg(row)?;
    let removed = context.session.delete_row(row)?;
    output::success(format!(
        "Deleted `{}` ({} {} on {}).",
        removed.description,
        removed.kind,
        money(removed.amount),
        removed.date
    ));
    Ok(())
}

fn cmd_upcoming(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (row, months) = match args {
        [row] => (parse_row_arg(row)?, DEFAULT_UPCOMING_MONTHS),
        [row, months] => {
            let months = months.parse::<u32>().map_err(|_| {
                CommandError::InvalidArguments(format!("`{months}` is not a number of months"))
            })?;
            (parse_row_arg(row)?, months)
        }
        _ => return Err(usage_error("upcoming <row> [months]")),
    };
    let snapshot = context.session.snapshot();
    let entry = snapshot
        .ledger
        .entry(row)
        .ok_or(LedgerError::RowOutOfRange(row))?;
    let txn = &entry.transaction;
    let from = context.session.settings().start_date.unwrap_or(txn.date);
    let Some(until) = add_months(from, months) else {
        return Err(CommandError::InvalidArguments("window is out of range".into()));
    };

    let dates = recurrence::upcoming(txn, from, until);
    output::section(format!("{} ({})", txn.description, txn.frequency.label()));
    if dates.is_empty() {
        output::info(format!("No occurrences between {from} and {until}."));
        return Ok(());
    }
    if txn.frequency == Frequency::Monthly {
        let skipped = months_between(from, until)
            .filter(|(year, month)| recurrence::skips_month(txn.date, *year, *month))
            .count();
        if skipped > 0 {
            output::hint(format!(
                "Skips {skipped} month(s) in this window that have no day {}.",
                txn.date.day()
            ));
        }
    }
    let mut table = Table::new(vec![TableColumn::right("#"), TableColumn::left("Date")]);
    for (idx, date) in dates.iter().enumerate() {
        table.push(vec![(idx + 1).to_string(), date.to_string()]);
    }
    println!("{}", table.render());
    Ok(())
}

/// `(year, month)` pairs touched by the inclusive window.
fn months_between(from: NaiveDate, until: NaiveDate) -> impl Iterator<Item = (i32, u32)> {
    let first = from.year() * 12 + from.month0() as i32;
    let last = until.year() * 12 + until.month0() as i32;
    (first..=last).map(|index| (index.div_euclid(12), index.rem_euclid(12) as u32 + 1))
}
