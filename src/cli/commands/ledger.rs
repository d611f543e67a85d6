use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::table::{Table, TableColumn};

use super::{balance_cell, money, usage_error, CommandDefinition};

const DESCRIPTION_WIDTH: usize = 32;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "ledger",
            "Show transactions by date with running balances",
            "ledger",
            cmd_ledger,
        ),
        CommandDefinition::new(
            "summary",
            "Show ledger totals and projection highlights",
            "summary",
            cmd_summary,
        ),
    ]
}

fn cmd_ledger(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if !args.is_empty() {
        return Err(usage_error("ledger"));
    }
    let ledger = &context.session.snapshot().ledger;
    output::section("Ledger");
    output::info(format!("Opening balance: {}", money(ledger.opening_balance)));
    if ledger.is_empty() {
        output::info("No transactions yet. Use `add` to create one.");
        return Ok(());
    }

    let mut table = Table::new(vec![
        TableColumn::right("#"),
        TableColumn::left("Date"),
        TableColumn::left("Description").max_width(DESCRIPTION_WIDTH),
        TableColumn::left("Kind"),
        TableColumn::left("Frequency"),
        TableColumn::right("Amount"),
        TableColumn::right("Balance"),
    ]);
    for (idx, entry) in ledger.entries.iter().enumerate() {
        let txn = &entry.transaction;
        table.push(vec![
            (idx + 1).to_string(),
            txn.date.to_string(),
            txn.description.clone(),
            txn.kind.to_string(),
            txn.frequency.label().to_string(),
            money(txn.signed_amount()),
            balance_cell(entry.balance),
        ]);
    }
    println!("{}", table.render());
    Ok(())
}

fn cmd_summary(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if !args.is_empty() {
        return Err(usage_error("summary"));
    }
    let snapshot = context.session.snapshot();
    let totals = snapshot.ledger.totals();
    output::section("Summary");
    output::info(format!("Transactions   : {}", snapshot.ledger.len()));
    output::info(format!("Income total   : {}", money(totals.income)));
    output::info(format!("Expense total  : {}", money(totals.expense)));
    output::info(format!(
        "Ledger balance : {}",
        balance_cell(snapshot.ledger.closing_balance())
    ));

    let Some(summary) = snapshot.summary() else {
        output::info("Projection     : not configured (set a start date with `config`)");
        return Ok(());
    };
    output::info(format!(
        "Projection     : {} to {} ({} days, {} occurrences)",
        summary.first_date, summary.last_date, summary.days, summary.occurrences
    ));
    output::info(format!(
        "Closing balance: {}",
        balance_cell(summary.closing_balance)
    ));
    output::info(format!(
        "Lowest balance : {} on {}",
        balance_cell(summary.lowest_balance),
        summary.lowest_balance_date
    ));
    match summary.first_overdraft {
        Some(date) => output::warning(format!("Balance first drops below zero on {date}.")),
        None => output::success("Balance stays at or above zero for the whole horizon."),
    }
    Ok(())
}
