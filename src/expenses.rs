use rust_decimal::Decimal;

use crate::categorizer::Categorizer;
use crate::chart::{Annotation, Cell, Figure, Panel, PanelKind, Ring, Series};
use crate::error::{Result, VizError};
use crate::fmt::{to_f64, whole};
use crate::importer::StatementLoad;
use crate::models::CategoryBucket;
use crate::reports::{aggregate, headline_split, shares, Aggregates, HeadlineSplit};
use crate::settings::StatementSettings;

const SUMMARY_WIDTH: usize = 60;
const PEAK_COLOR: &str = "red";

/// A statement classified and summed, ready for the dashboard or the terminal.
pub struct Expenses {
    pub aggregates: Aggregates,
    /// Outer/inner donut rings, in charted (spend) terms.
    pub split: HeadlineSplit,
    /// Outer ring as percentages.
    pub shares: Vec<(String, Decimal)>,
    pub debits_only: bool,
    pub excluded: usize,
    pub skipped: usize,
    pub matched: usize,
    pub defaulted: usize,
}

pub fn analyze(load: StatementLoad, settings: &StatementSettings, include_credits: bool) -> Result<Expenses> {
    let debits_only = !include_credits;
    let records: Vec<_> = load
        .records
        .into_iter()
        .filter(|r| !debits_only || r.is_debit())
        .collect();
    if records.is_empty() {
        let what = if debits_only { "debit transactions" } else { "transactions" };
        return Err(VizError::NoData(format!("statement has no {what} left after filtering")));
    }

    let categorizer = Categorizer::new(&settings.categories, &settings.default_category);
    let result = categorizer.categorize(records);
    let aggregates = aggregate(&result.records, categorizer.labels(), categorizer.default_label());

    let charted: Vec<_> = aggregates
        .by_category
        .iter()
        .map(|b| CategoryBucket {
            category: b.category.clone(),
            total: spend(b.total, debits_only),
        })
        .collect();
    let split = headline_split(&charted, &settings.headline_category, &settings.default_category);
    let shares = shares(&split.outer);

    Ok(Expenses {
        aggregates,
        split,
        shares,
        debits_only,
        excluded: load.excluded,
        skipped: load.skipped,
        matched: result.matched,
        defaulted: result.defaulted,
    })
}

/// Debits are charted as positive spend; net figures are left signed.
fn spend(value: Decimal, debits_only: bool) -> Decimal {
    if debits_only {
        -value
    } else {
        value
    }
}

/// Cycle `colors` to `len` entries.
fn cycle(colors: &[String], len: usize) -> Vec<String> {
    if colors.is_empty() {
        return Vec::new();
    }
    (0..len).map(|i| colors[i % colors.len()].clone()).collect()
}

impl Expenses {
    pub fn spend(&self, value: Decimal) -> Decimal {
        spend(value, self.debits_only)
    }

    pub fn total(&self) -> Decimal {
        self.split.outer.iter().map(|(_, v)| *v).sum()
    }

    pub fn share_of(&self, label: &str) -> Decimal {
        self.shares
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, pct)| *pct)
            .unwrap_or_default()
    }

    pub fn title(&self, settings: &StatementSettings) -> String {
        match self.aggregates.period_label() {
            Some(period) => format!("{} ({period})", settings.title),
            None => settings.title.clone(),
        }
    }

    /// Summary paragraph, each line wrapped to 60 columns.
    pub fn summary_text(&self, settings: &StatementSettings) -> String {
        let cur = settings.currency.as_str();
        let period = self.aggregates.period_label().unwrap_or_default();
        let months = self.aggregates.span_months();
        let noun = if self.debits_only { "expenditure" } else { "net flow" };
        let mut lines = vec![
            format!("Expenditure Summary ({period})"),
            format!(
                "Over the {months}-month period, total {noun} reached {}, with {} at {:.1}%.",
                whole(self.total(), cur),
                settings.headline_category,
                self.share_of(&settings.headline_category),
            ),
            format!(
                "{} categories accounted for {:.1}%.",
                settings.default_category,
                self.share_of(&settings.default_category),
            ),
        ];
        if let Some(peak) = self.aggregates.peak_month() {
            lines.push(format!(
                "Spending peaked in {} with {} spent.",
                if self.aggregates.spans_years() {
                    format!("{} {}", peak.month.long_name(), peak.month.year)
                } else {
                    peak.month.long_name()
                },
                whole(self.spend(peak.total()), cur),
            ));
        }
        lines
            .iter()
            .map(|line| textwrap::fill(line, SUMMARY_WIDTH))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn build_figure(&self, settings: &StatementSettings, footer: &str) -> Result<Figure> {
        let cur = settings.currency.as_str();
        let amount_axis = format!("Amount Spent ({cur})");
        let mut fig = Figure::new(self.title(settings), 2, 2).size(1300, 800);

        // Nested donut: headline vs the rest, then the rest broken down.
        let colors = &settings.category_colors;
        let outer_colors = match (colors.first(), colors.last()) {
            (Some(first), Some(last)) => vec![first.clone(), last.clone()],
            _ => Vec::new(),
        };
        let inner_colors = cycle(colors.get(1..).unwrap_or_default(), self.split.inner.len());
        let ring = |name: String, values: &[(String, Decimal)]| {
            let hover = values
                .iter()
                .map(|(l, v)| format!("{l}<br>{}", whole(*v, cur)))
                .collect();
            Ring::new(
                name,
                values.iter().map(|(l, _)| l.clone()).collect(),
                values.iter().map(|(_, v)| to_f64(*v)).collect(),
            )
            .hover(hover)
        };
        fig.push(Panel::new(
            "Expenditure Share by Category (%)",
            Cell::spanning(0, 0, 2),
            PanelKind::Donut(vec![
                ring("Share".to_string(), &self.split.outer).colors(outer_colors),
                ring(
                    format!("{} Category Breakdown", settings.default_category),
                    &self.split.inner,
                )
                .colors(inner_colors)
                .legend_only(),
            ]),
        ));

        let months = &self.aggregates.by_month;
        let month_values: Vec<Decimal> = months.iter().map(|b| self.spend(b.total())).collect();
        let month_panel = fig.push(
            Panel::new(
                "Monthly Expenditure Breakdown",
                Cell::at(0, 1),
                PanelKind::Bar(
                    Series::new(
                        "Months",
                        self.aggregates.month_labels(),
                        month_values.iter().map(|v| to_f64(*v)).collect(),
                    )
                    .hover(
                        months
                            .iter()
                            .zip(&month_values)
                            .map(|(b, v)| {
                                format!(
                                    "Month: {} {}<br>Spent: {}",
                                    b.month.long_name(),
                                    b.month.year,
                                    whole(*v, cur)
                                )
                            })
                            .collect(),
                    )
                    .colors(cycle(&settings.month_colors, months.len())),
                ),
            )
            .axes("Months", &amount_axis),
        );

        let cats = &self.aggregates.by_category;
        let cat_values: Vec<Decimal> = cats.iter().map(|b| self.spend(b.total)).collect();
        fig.push(
            Panel::new(
                "Categorical Expenditure",
                Cell::at(1, 1),
                PanelKind::Bar(
                    Series::new(
                        "Categories",
                        cats.iter().map(|b| b.category.clone()).collect(),
                        cat_values.iter().map(|v| to_f64(*v)).collect(),
                    )
                    .hover(
                        cats.iter()
                            .zip(&cat_values)
                            .map(|(b, v)| format!("Category: {}<br>Spent: {}", b.category, whole(*v, cur)))
                            .collect(),
                    )
                    .colors(cycle(colors, cats.len())),
                ),
            )
            .axes("Category", &amount_axis),
        );

        if let Some(peak) = self.aggregates.peak_month() {
            if let Some(point) = months.iter().position(|b| b.month == peak.month) {
                fig.annotations.push(Annotation {
                    panel: month_panel,
                    point,
                    text: format!("Peak: {}", whole(month_values[point], cur)),
                    color: PEAK_COLOR.to_string(),
                });
            }
        }

        fig.summary = Some(self.summary_text(settings));
        if !footer.is_empty() {
            fig.footer = Some(footer.to_string());
        }
        Ok(fig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn rec(date: &str, desc: &str, amount: Decimal) -> Record {
        Record::new(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(), desc, amount)
    }

    fn load(records: Vec<Record>) -> StatementLoad {
        StatementLoad {
            records,
            excluded: 2,
            skipped: 0,
        }
    }

    fn sample() -> Vec<Record> {
        vec![
            rec("2025-05-02", "Transfer to Ada", dec!(-600)),
            rec("2025-05-09", "Airtime purchase", dec!(-100)),
            rec("2025-06-01", "Salary", dec!(5000)),
            rec("2025-06-03", "Mobile Data bundle", dec!(-200)),
            rec("2025-06-20", "Electricity token", dec!(-100)),
        ]
    }

    #[test]
    fn test_debits_only_by_default() {
        let settings = StatementSettings::default();
        let e = analyze(load(sample()), &settings, false).unwrap();
        assert!(e.debits_only);
        assert_eq!(e.total(), dec!(1000));
        assert_eq!(e.aggregates.total(), dec!(-1000));
        assert_eq!(e.excluded, 2);
        assert_eq!(e.matched, 4);
        assert_eq!(e.defaulted, 0);
    }

    #[test]
    fn test_headline_split_and_shares() {
        let settings = StatementSettings::default();
        let e = analyze(load(sample()), &settings, false).unwrap();
        assert_eq!(
            e.split.outer,
            vec![("Transfers".to_string(), dec!(600)), ("Others".to_string(), dec!(400))]
        );
        assert_eq!(e.share_of("Transfers"), dec!(60.0));
        assert_eq!(e.share_of("Others"), dec!(40.0));
        assert!(e.split.inner.iter().all(|(l, _)| l != "Transfers"));
    }

    #[test]
    fn test_include_credits_keeps_signed_totals() {
        let settings = StatementSettings::default();
        let e = analyze(load(sample()), &settings, true).unwrap();
        assert!(!e.debits_only);
        assert_eq!(e.aggregates.total(), dec!(4000));
        assert_eq!(e.aggregates.category("Others"), Some(dec!(5000)));
    }

    #[test]
    fn test_no_debits_is_an_error() {
        let settings = StatementSettings::default();
        let only_credit = vec![rec("2025-06-01", "Salary", dec!(5000))];
        let err = analyze(load(only_credit), &settings, false).err().unwrap();
        assert!(matches!(err, VizError::NoData(_)));
    }

    #[test]
    fn test_summary_text() {
        let settings = StatementSettings::default();
        let e = analyze(load(sample()), &settings, false).unwrap();
        let text = e.summary_text(&settings);
        assert!(text.starts_with("Expenditure Summary (May\u{2013}Jun 2025)"));
        assert!(text.contains("\u{20a6}1,000"));
        assert!(text.contains("60.0%"));
        assert!(text.contains("Spending peaked in May with \u{20a6}700 spent."));
        assert!(text.lines().all(|l| l.chars().count() <= 60));
    }

    #[test]
    fn test_figure_panels() {
        let settings = StatementSettings::default();
        let e = analyze(load(sample()), &settings, false).unwrap();
        let fig = e.build_figure(&settings, "footer").unwrap();
        assert_eq!(fig.title, "Expenditure Overview (May\u{2013}Jun 2025)");
        assert_eq!(fig.panels.len(), 3);
        assert_eq!(fig.panels[0].cell.row_span, 2);
        let PanelKind::Donut(rings) = &fig.panels[0].kind else {
            panic!("expected donut");
        };
        assert_eq!(rings.len(), 2);
        assert!(!rings[1].show_labels);
        let PanelKind::Bar(months) = &fig.panels[1].kind else {
            panic!("expected bar");
        };
        assert_eq!(months.labels, vec!["May", "Jun"]);
        assert_eq!(months.values, vec![700.0, 300.0]);
        assert_eq!(months.colors, vec!["red", "green"]);
        assert_eq!(fig.annotations.len(), 1);
        assert_eq!(fig.annotations[0].point, 0);
        assert!(fig.summary.is_some());
        assert_eq!(fig.footer.as_deref(), Some("footer"));
    }

    #[test]
    fn test_multi_year_statement_labels_months_with_year() {
        let settings = StatementSettings::default();
        let records = vec![
            rec("2024-05-10", "Transfer to Ada", dec!(-300)),
            rec("2025-05-10", "Transfer to Ada", dec!(-900)),
        ];
        let e = analyze(load(records), &settings, false).unwrap();
        let fig = e.build_figure(&settings, "").unwrap();
        let PanelKind::Bar(months) = &fig.panels[1].kind else {
            panic!("expected bar");
        };
        assert_eq!(months.labels, vec!["May 2024", "May 2025"]);
        assert_eq!(fig.annotations[0].point, 1);
        let text = e.summary_text(&settings);
        assert!(text.contains("Over the 13-month period"));
        assert!(text.contains("Spending peaked in May 2025"));
    }

    #[test]
    fn test_period_length_counts_gap_months() {
        let settings = StatementSettings::default();
        let records = vec![
            rec("2025-05-02", "Airtime purchase", dec!(-100)),
            rec("2025-07-02", "Airtime purchase", dec!(-100)),
        ];
        let e = analyze(load(records), &settings, false).unwrap();
        assert!(e.summary_text(&settings).contains("Over the 3-month period"));
    }
}
