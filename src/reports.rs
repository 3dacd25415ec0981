use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::models::{CategoryBucket, ClassifiedRecord, MonthBucket, MonthKey, Peak};

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

pub struct Aggregates {
    /// Chronological.
    pub by_month: Vec<MonthBucket>,
    /// Configured order, then the default category, then anything else seen.
    pub by_category: Vec<CategoryBucket>,
    /// Month with the largest absolute total.
    pub peak: Option<Peak<Decimal>>,
}

impl Aggregates {
    pub fn total(&self) -> Decimal {
        self.by_month.iter().map(MonthBucket::total).sum()
    }

    #[cfg(test)]
    pub fn category(&self, label: &str) -> Option<Decimal> {
        self.by_category
            .iter()
            .find(|b| b.category == label)
            .map(|b| b.total)
    }

    #[cfg(test)]
    pub fn month(&self, key: MonthKey) -> Option<&MonthBucket> {
        self.by_month.iter().find(|b| b.month == key)
    }

    pub fn peak_month(&self) -> Option<&MonthBucket> {
        let peak = self.peak.as_ref()?;
        self.by_month.iter().find(|b| b.month.key() == peak.label)
    }

    /// True when the months cover more than one calendar year.
    pub fn spans_years(&self) -> bool {
        match (self.by_month.first(), self.by_month.last()) {
            (Some(first), Some(last)) => first.month.year != last.month.year,
            _ => false,
        }
    }

    /// Calendar months from the first to the last month, gaps included.
    pub fn span_months(&self) -> usize {
        match (self.by_month.first(), self.by_month.last()) {
            (Some(first), Some(last)) => (last.month.ordinal() - first.month.ordinal() + 1) as usize,
            _ => 0,
        }
    }

    /// Axis labels for `by_month`: "May", or "May 2024" once the range crosses a year.
    pub fn month_labels(&self) -> Vec<String> {
        let with_year = self.spans_years();
        self.by_month
            .iter()
            .map(|b| {
                if with_year {
                    format!("{} {}", b.month.label(), b.month.year)
                } else {
                    b.month.label()
                }
            })
            .collect()
    }

    /// "May–Oct 2025", "Nov 2024–Feb 2025" or "May 2025".
    pub fn period_label(&self) -> Option<String> {
        let first = self.by_month.first()?.month;
        let last = self.by_month.last()?.month;
        Some(if first == last {
            format!("{} {}", first.label(), first.year)
        } else if first.year == last.year {
            format!("{}\u{2013}{} {}", first.label(), last.label(), last.year)
        } else {
            format!(
                "{} {}\u{2013}{} {}",
                first.label(),
                first.year,
                last.label(),
                last.year
            )
        })
    }
}

/// Sum classified records per month and per category and find the peak month.
///
/// `configured` lists the rule labels in order; they always get a bucket, even
/// when nothing landed in them. The peak label is the month's `YYYY-MM` key.
pub fn aggregate<'a>(
    records: &[ClassifiedRecord],
    configured: impl IntoIterator<Item = &'a str>,
    default_label: &str,
) -> Aggregates {
    let mut months: BTreeMap<MonthKey, (Decimal, Decimal)> = BTreeMap::new();
    for r in records {
        let entry = months.entry(r.record.month()).or_default();
        if r.record.amount.is_sign_negative() {
            entry.0 += r.record.amount;
        } else {
            entry.1 += r.record.amount;
        }
    }
    let by_month: Vec<MonthBucket> = months
        .into_iter()
        .map(|(month, (debit, credit))| MonthBucket {
            month,
            debit,
            credit,
        })
        .collect();

    let mut by_category: Vec<CategoryBucket> = configured
        .into_iter()
        .map(|label| CategoryBucket {
            category: label.to_string(),
            total: Decimal::ZERO,
        })
        .collect();
    let fixed = by_category.len();
    for r in records {
        match by_category.iter_mut().find(|b| b.category == r.category) {
            Some(bucket) => bucket.total += r.record.amount,
            None => by_category.push(CategoryBucket {
                category: r.category.clone(),
                total: r.record.amount,
            }),
        }
    }
    // Default bucket goes straight after the configured ones.
    if let Some(pos) = by_category[fixed..]
        .iter()
        .position(|b| b.category == default_label)
    {
        let bucket = by_category.remove(fixed + pos);
        by_category.insert(fixed, bucket);
    }

    let peak = find_peak(by_month.iter().map(|b| (b.month.key(), b.total())));
    if let Some(p) = &peak {
        tracing::debug!(month = %p.label, value = %p.value, "peak month");
    }

    Aggregates {
        by_month,
        by_category,
        peak,
    }
}

// ---------------------------------------------------------------------------
// Peak detection
// ---------------------------------------------------------------------------

/// Position of the largest-magnitude value; on a tie the earlier one is kept.
pub fn peak_index<V: Magnitude>(values: impl IntoIterator<Item = V>) -> Option<usize> {
    let mut best: Option<(usize, Decimal)> = None;
    for (i, value) in values.into_iter().enumerate() {
        let m = value.magnitude();
        if best.map_or(true, |(_, current)| m > current) {
            best = Some((i, m));
        }
    }
    best.map(|(i, _)| i)
}

/// Largest-magnitude entry; on a tie the earlier entry is kept.
pub fn find_peak<L, V>(series: impl IntoIterator<Item = (L, V)>) -> Option<Peak<V>>
where
    L: Into<String>,
    V: Magnitude + Copy,
{
    let series: Vec<(L, V)> = series.into_iter().collect();
    let i = peak_index(series.iter().map(|(_, v)| *v))?;
    series.into_iter().nth(i).map(|(label, value)| Peak {
        label: label.into(),
        value,
    })
}

pub trait Magnitude {
    fn magnitude(&self) -> Decimal;
}

impl Magnitude for Decimal {
    fn magnitude(&self) -> Decimal {
        self.abs()
    }
}

// ---------------------------------------------------------------------------
// Donut split + shares
// ---------------------------------------------------------------------------

pub struct HeadlineSplit {
    /// `[(headline, total), (rest_label, total)]`.
    pub outer: Vec<(String, Decimal)>,
    /// Every category except the headline.
    pub inner: Vec<(String, Decimal)>,
}

/// Split category totals into the headline category and everything else.
pub fn headline_split(buckets: &[CategoryBucket], headline: &str, rest_label: &str) -> HeadlineSplit {
    let headline_total: Decimal = buckets
        .iter()
        .filter(|b| b.category == headline)
        .map(|b| b.total)
        .sum();
    let inner: Vec<(String, Decimal)> = buckets
        .iter()
        .filter(|b| b.category != headline)
        .map(|b| (b.category.clone(), b.total))
        .collect();
    let rest_total: Decimal = inner.iter().map(|(_, t)| *t).sum();
    HeadlineSplit {
        outer: vec![
            (headline.to_string(), headline_total),
            (rest_label.to_string(), rest_total),
        ],
        inner,
    }
}

/// Each value as a percentage of the total, to one decimal place.
pub fn shares(values: &[(String, Decimal)]) -> Vec<(String, Decimal)> {
    let total: Decimal = values.iter().map(|(_, v)| *v).sum();
    values
        .iter()
        .map(|(label, v)| {
            let pct = if total.is_zero() {
                Decimal::ZERO
            } else {
                (*v / total * Decimal::ONE_HUNDRED).round_dp(1)
            };
            (label.clone(), pct)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorizer::{Categorizer, CategoryRule};
    use crate::models::Record;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn rec(date: &str, desc: &str, amount: Decimal) -> Record {
        Record::new(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(), desc, amount)
    }

    fn run(records: Vec<Record>, rules: &[CategoryRule]) -> Aggregates {
        let c = Categorizer::new(rules, "Others");
        let classified = c.categorize(records).records;
        aggregate(&classified, c.labels(), c.default_label())
    }

    #[test]
    fn test_transfer_and_netflix_example() {
        let agg = run(
            vec![
                rec("2025-05-01", "Transfer to John", dec!(-500)),
                rec("2025-05-15", "Netflix", dec!(-20)),
            ],
            &[CategoryRule::new("Transfers", &["transfer"])],
        );
        assert_eq!(agg.by_category.len(), 2);
        assert_eq!(agg.category("Transfers"), Some(dec!(-500)));
        assert_eq!(agg.category("Others"), Some(dec!(-20)));
        assert_eq!(agg.by_month.len(), 1);
        assert_eq!(agg.by_month[0].month.label(), "May");
        assert_eq!(agg.by_month[0].total(), dec!(-520));
        assert_eq!(agg.by_month[0].debit, dec!(-520));
        assert_eq!(agg.by_month[0].credit, dec!(0));
    }

    #[test]
    fn test_totals_are_conserved() {
        let records = vec![
            rec("2025-05-01", "Transfer to Ama", dec!(-5000.25)),
            rec("2025-05-09", "Airtime", dec!(-200)),
            rec("2025-06-02", "Salary", dec!(150000)),
            rec("2025-06-11", "Electricity token", dec!(-7500.50)),
            rec("2025-07-30", "POS purchase", dec!(-1234.56)),
            rec("2025-07-30", "Refund", dec!(0)),
        ];
        let input_total: Decimal = records.iter().map(|r| r.amount).sum();
        let agg = run(
            records,
            &[
                CategoryRule::new("Transfers", &["transfer to"]),
                CategoryRule::new("Airtime", &["airtime"]),
                CategoryRule::new("Bills", &["electricity"]),
            ],
        );
        let category_total: Decimal = agg.by_category.iter().map(|b| b.total).sum();
        assert_eq!(category_total, input_total);
        assert_eq!(agg.total(), input_total);
    }

    #[test]
    fn test_single_record_lands_in_its_month_and_category() {
        let agg = run(
            vec![rec("2025-08-17", "MTN mobile data", dec!(-1000))],
            &[CategoryRule::new("Mobile Data", &["mobile data"])],
        );
        let aug = agg.month(MonthKey { year: 2025, month: 8 }).unwrap();
        assert_eq!(aug.total(), dec!(-1000));
        assert_eq!(agg.category("Mobile Data"), Some(dec!(-1000)));
        assert_eq!(agg.category("Others"), None);
    }

    #[test]
    fn test_configured_categories_keep_order_and_zero_buckets() {
        let agg = run(
            vec![
                rec("2025-05-01", "Netflix", dec!(-20)),
                rec("2025-05-02", "Airtime", dec!(-100)),
            ],
            &[
                CategoryRule::new("Transfers", &["transfer to"]),
                CategoryRule::new("Airtime", &["airtime"]),
            ],
        );
        let labels: Vec<&str> = agg.by_category.iter().map(|b| b.category.as_str()).collect();
        assert_eq!(labels, ["Transfers", "Airtime", "Others"]);
        assert_eq!(agg.category("Transfers"), Some(dec!(0)));
    }

    #[test]
    fn test_months_are_chronological_and_split_debit_credit() {
        let agg = run(
            vec![
                rec("2025-06-03", "a", dec!(-10)),
                rec("2025-05-03", "b", dec!(-30)),
                rec("2025-05-04", "c", dec!(50)),
            ],
            &[],
        );
        let keys: Vec<String> = agg.by_month.iter().map(|b| b.month.key()).collect();
        assert_eq!(keys, ["2025-05", "2025-06"]);
        assert_eq!(agg.by_month[0].debit, dec!(-30));
        assert_eq!(agg.by_month[0].credit, dec!(50));
        assert_eq!(agg.by_month[0].total(), dec!(20));
    }

    #[test]
    fn test_same_month_in_two_years_gets_distinct_labels() {
        let agg = run(
            vec![
                rec("2024-05-01", "a", dec!(-10)),
                rec("2024-11-20", "b", dec!(-5)),
                rec("2025-05-01", "c", dec!(-20)),
            ],
            &[],
        );
        assert!(agg.spans_years());
        assert_eq!(agg.month_labels(), ["May 2024", "Nov 2024", "May 2025"]);
        assert_eq!(agg.span_months(), 13);
    }

    #[test]
    fn test_span_counts_gap_months() {
        let agg = run(
            vec![rec("2025-05-01", "a", dec!(-10)), rec("2025-08-01", "b", dec!(-20))],
            &[],
        );
        assert!(!agg.spans_years());
        assert_eq!(agg.month_labels(), ["May", "Aug"]);
        assert_eq!(agg.by_month.len(), 2);
        assert_eq!(agg.span_months(), 4);
    }

    #[test]
    fn test_peak_index() {
        assert_eq!(peak_index(vec![dec!(10), dec!(-40), dec!(40)]), Some(1));
        assert_eq!(peak_index(Vec::<Decimal>::new()), None);
    }

    #[test]
    fn test_peak_is_largest_magnitude() {
        let peak = find_peak(vec![("May", dec!(-520)), ("Jun", dec!(-100))]).unwrap();
        assert_eq!(peak.label, "May");
        assert_eq!(peak.value, dec!(-520));
    }

    #[test]
    fn test_peak_tie_keeps_first_and_empty_has_none() {
        let peak = find_peak(vec![("Jan", dec!(30)), ("Feb", dec!(-30))]).unwrap();
        assert_eq!(peak.label, "Jan");
        assert!(find_peak(Vec::<(&str, Decimal)>::new()).is_none());
    }

    #[test]
    fn test_aggregate_peak_points_at_month() {
        let agg = run(
            vec![
                rec("2025-05-01", "x", dec!(-520)),
                rec("2025-06-01", "y", dec!(-100)),
            ],
            &[],
        );
        let peak = agg.peak.as_ref().unwrap();
        assert_eq!(peak.label, "2025-05");
        assert_eq!(peak.value, dec!(-520));
        assert_eq!(agg.peak_month().unwrap().month.long_name(), "May");
    }

    #[test]
    fn test_period_label() {
        let agg = run(
            vec![
                rec("2025-05-01", "x", dec!(-1)),
                rec("2025-10-01", "y", dec!(-1)),
            ],
            &[],
        );
        assert_eq!(agg.period_label().unwrap(), "May\u{2013}Oct 2025");

        let agg = run(
            vec![
                rec("2024-11-01", "x", dec!(-1)),
                rec("2025-02-01", "y", dec!(-1)),
            ],
            &[],
        );
        assert_eq!(agg.period_label().unwrap(), "Nov 2024\u{2013}Feb 2025");

        let agg = run(vec![rec("2025-05-01", "x", dec!(-1))], &[]);
        assert_eq!(agg.period_label().unwrap(), "May 2025");
        assert!(run(vec![], &[]).period_label().is_none());
    }

    #[test]
    fn test_headline_split_and_shares() {
        let buckets = vec![
            CategoryBucket { category: "Transfers".into(), total: dec!(750) },
            CategoryBucket { category: "Airtime".into(), total: dec!(100) },
            CategoryBucket { category: "Others".into(), total: dec!(150) },
        ];
        let split = headline_split(&buckets, "Transfers", "Others");
        assert_eq!(split.outer[0], ("Transfers".to_string(), dec!(750)));
        assert_eq!(split.outer[1], ("Others".to_string(), dec!(250)));
        assert_eq!(split.inner.len(), 2);

        let pct = shares(&split.outer);
        assert_eq!(pct[0].1, dec!(75.0));
        assert_eq!(pct[1].1, dec!(25.0));
    }

    #[test]
    fn test_shares_of_zero_total_are_zero() {
        let pct = shares(&[("a".to_string(), dec!(0)), ("b".to_string(), dec!(0))]);
        assert!(pct.iter().all(|(_, p)| p.is_zero()));
    }
}
