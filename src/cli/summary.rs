use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::expenses::{analyze, Expenses};
use crate::fmt::money;
use crate::importer::load_statement;
use crate::settings::{Settings, StatementSettings};

pub fn run(settings: &Settings, file: &Path, include_credits: bool) -> Result<()> {
    let load = load_statement(file, &settings.statement)?;
    let expenses = analyze(load, &settings.statement, include_credits)?;
    println!("{}", format_summary(&expenses, &settings.statement));
    Ok(())
}

pub fn format_summary(expenses: &Expenses, settings: &StatementSettings) -> String {
    let cur = settings.currency.as_str();
    let agg = &expenses.aggregates;

    let mut months = Table::new();
    months.set_header(vec!["Month", "Debit", "Credit", "Net"]);
    for b in &agg.by_month {
        let net = b.total();
        let net_str = if net.is_sign_negative() {
            money(net, cur).red().to_string()
        } else {
            money(net, cur).green().to_string()
        };
        months.add_row(vec![
            Cell::new(format!("{} {}", b.month.label(), b.month.year)),
            Cell::new(money(b.debit.abs(), cur)),
            Cell::new(money(b.credit, cur)),
            Cell::new(net_str),
        ]);
    }
    months.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(""),
        Cell::new(""),
        Cell::new(money(agg.total(), cur)),
    ]);

    let mut cats = Table::new();
    cats.set_header(vec!["Category", "Amount"]);
    for b in &agg.by_category {
        cats.add_row(vec![
            Cell::new(&b.category),
            Cell::new(money(expenses.spend(b.total), cur)),
        ]);
    }

    let mut split = Table::new();
    split.set_header(vec!["Share", "Amount", "%"]);
    for ((label, value), (_, pct)) in expenses.split.outer.iter().zip(&expenses.shares) {
        split.add_row(vec![
            Cell::new(label),
            Cell::new(money(*value, cur)),
            Cell::new(format!("{pct:.1}%")),
        ]);
    }

    let mut out = format!(
        "{}\n\nBy Month\n{months}\n\nBy Category\n{cats}\n\n{} vs {}\n{split}",
        expenses.title(settings).bold(),
        settings.headline_category,
        settings.default_category,
    );
    if let Some(peak) = agg.peak_month() {
        out.push_str(&format!(
            "\n\nPeak month: {} ({})",
            peak.month.long_name(),
            money(expenses.spend(peak.total()), cur)
        ));
    }
    out.push_str(&format!(
        "\nClassified: {} matched, {} defaulted to {}; {} excluded, {} skipped",
        expenses.matched,
        expenses.defaulted,
        settings.default_category,
        expenses.excluded,
        expenses.skipped,
    ));
    out
}
