use comfy_table::{Cell, Table};

use crate::categorizer::{contains_any, Categorizer};
use crate::error::Result;
use crate::settings::{Settings, StatementSettings};

pub fn run(settings: &Settings, check: Option<&str>) -> Result<()> {
    match check {
        Some(description) => println!("{}", check_description(&settings.statement, description)),
        None => println!("{}", format_categories(&settings.statement)),
    }
    Ok(())
}

/// What the loader and classifier would do with one description.
pub fn check_description(settings: &StatementSettings, description: &str) -> String {
    if contains_any(description, &settings.exclude) {
        return format!("'{description}' is excluded before classification");
    }
    let categorizer = Categorizer::new(&settings.categories, &settings.default_category);
    format!("'{description}' -> {}", categorizer.classify(description))
}

/// Rules in match order, then the fallback and the exclusion words.
pub fn format_categories(settings: &StatementSettings) -> String {
    let mut table = Table::new();
    table.set_header(vec!["#", "Category", "Keywords"]);
    for (i, rule) in settings.categories.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&rule.label),
            Cell::new(rule.keywords.join(", ")),
        ]);
    }
    table.add_row(vec![
        Cell::new(""),
        Cell::new(&settings.default_category),
        Cell::new("(no match)"),
    ]);
    let excluded = if settings.exclude.is_empty() {
        "none".to_string()
    } else {
        settings.exclude.join(", ")
    };
    format!("Categories (first match wins)\n{table}\n\nExcluded: {excluded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_categories_lists_rules_in_order() {
        let out = format_categories(&StatementSettings::default());
        let transfers = out.find("Transfers").unwrap();
        let airtime = out.find("Airtime").unwrap();
        assert!(transfers < airtime);
        assert!(out.contains("transfer to"));
        assert!(out.contains("Others"));
        assert!(out.contains("Excluded: OWealth Withdrawal, Card, Save"));
    }

    #[test]
    fn test_check_description() {
        let settings = StatementSettings::default();
        assert_eq!(
            check_description(&settings, "Transfer to John"),
            "'Transfer to John' -> Transfers"
        );
        assert_eq!(check_description(&settings, "Netflix"), "'Netflix' -> Others");
        assert!(check_description(&settings, "Debit Card fee").contains("excluded"));
    }
}
