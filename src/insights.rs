use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use rust_decimal::Decimal;

use crate::chart::{Cell, Figure, Panel, PanelKind, Series};
use crate::error::{Result, VizError};
use crate::fmt::{money, to_f64};
use crate::models::{EnrichedSale, SalesRow, Tier};
use crate::settings::InsightSettings;

const PREMIUM_FLOOR: i64 = 200;
const MID_FLOOR: i64 = 100;
const GOLD: &str = "Gold";

pub fn region_name(code: &str) -> &'static str {
    match code.trim().to_ascii_uppercase().as_str() {
        "CA" => "California",
        "NY" => "New York",
        "TX" => "Texas",
        "WA" => "Washington",
        _ => "Unknown",
    }
}

pub fn tier(total: Decimal) -> Tier {
    if total >= Decimal::from(PREMIUM_FLOOR) {
        Tier::Premium
    } else if total >= Decimal::from(MID_FLOOR) {
        Tier::Mid
    } else {
        Tier::Budget
    }
}

/// Add line totals, region names, tiers, weekdays and VIP levels.
pub fn enrich(rows: Vec<SalesRow>, vip: &HashMap<String, String>) -> Vec<EnrichedSale> {
    rows.into_iter()
        .map(|row| {
            let total = row.total();
            EnrichedSale {
                day: row.date.format("%A").to_string(),
                vip_level: vip.get(&row.customer).cloned(),
                region: region_name(&row.region).to_string(),
                tier: tier(total),
                total,
                date: row.date,
                customer: row.customer,
                category: row.category,
                price: row.price,
                quantity: row.quantity,
            }
        })
        .collect()
}

/// Sum `value` per `key`, sorted by key.
pub fn group_sum<K, V>(sales: &[EnrichedSale], key: K, value: V) -> BTreeMap<String, Decimal>
where
    K: Fn(&EnrichedSale) -> &str,
    V: Fn(&EnrichedSale) -> Decimal,
{
    let mut groups: BTreeMap<String, Decimal> = BTreeMap::new();
    for sale in sales {
        *groups.entry(key(sale).to_string()).or_default() += value(sale);
    }
    groups
}

/// Key with the largest summed total; ties go to the alphabetically first key.
pub fn top_by<K>(sales: &[EnrichedSale], key: K) -> Option<(String, Decimal)>
where
    K: Fn(&EnrichedSale) -> &str,
{
    let mut best: Option<(String, Decimal)> = None;
    for (k, total) in group_sum(sales, key, |s| s.total) {
        if best.as_ref().map_or(true, |(_, b)| total > *b) {
            best = Some((k, total));
        }
    }
    best
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insights {
    pub best_region: (String, Decimal),
    pub top_customer: (String, Decimal),
    pub top_category: (String, Decimal),
    pub best_day: (String, Decimal),
    pub revenue: Decimal,
    /// Lines with a total strictly above 200.
    pub large_orders: usize,
    /// Percentage of Premium revenue that came from Gold VIPs.
    pub gold_premium_share: Decimal,
}

pub fn summarize(sales: &[EnrichedSale]) -> Result<Insights> {
    let none = || VizError::NoData("sales file has no rows".to_string());
    let best_region = top_by(sales, |s| s.region.as_str()).ok_or_else(none)?;
    let top_customer = top_by(sales, |s| s.customer.as_str()).ok_or_else(none)?;
    let top_category = top_by(sales, |s| s.category.as_str()).ok_or_else(none)?;
    let best_day = top_by(sales, |s| s.day.as_str()).ok_or_else(none)?;

    let premium: Vec<&EnrichedSale> = sales.iter().filter(|s| s.tier == Tier::Premium).collect();
    let premium_total: Decimal = premium.iter().map(|s| s.total).sum();
    let gold_total: Decimal = premium
        .iter()
        .filter(|s| s.vip_level.as_deref() == Some(GOLD))
        .map(|s| s.total)
        .sum();
    let gold_premium_share = if premium_total.is_zero() {
        Decimal::ZERO
    } else {
        (gold_total / premium_total * Decimal::ONE_HUNDRED).round_dp(1)
    };

    Ok(Insights {
        best_region,
        top_customer,
        top_category,
        best_day,
        revenue: sales.iter().map(|s| s.total).sum(),
        large_orders: sales
            .iter()
            .filter(|s| s.total > Decimal::from(PREMIUM_FLOOR))
            .count(),
        gold_premium_share,
    })
}

/// Wrap each paragraph to `width`, keeping blank lines.
pub fn wrap_report(text: &str, width: usize) -> String {
    text.split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                textwrap::fill(line, width.max(1))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn report(insights: &Insights, settings: &InsightSettings) -> String {
    let cur = settings.currency.as_str();
    let text = format!(
        "Best Performing Region: {region} led overall sales with {region_total}.\n\
         \n\
         Most Valuable Customer: {customer} generated the highest value at {customer_total}.\n\
         \n\
         Top Sales Category: {category} brought in {category_total} of total revenue.\n\
         \n\
         Highest Revenue Day: {day} generated the highest cumulative revenue ({day_total}).\n\
         \n\
         Additional Insights:\n\
         - Total revenue: {revenue}.\n\
         - {large} order lines were above {cur}{floor}.\n\
         - {gold_level} VIP customers account for {gold:.1}% of {premium}-tier revenue.",
        region = insights.best_region.0,
        region_total = money(insights.best_region.1, cur),
        customer = insights.top_customer.0,
        customer_total = money(insights.top_customer.1, cur),
        category = insights.top_category.0,
        category_total = money(insights.top_category.1, cur),
        day = insights.best_day.0,
        day_total = money(insights.best_day.1, cur),
        revenue = money(insights.revenue, cur),
        large = insights.large_orders,
        floor = PREMIUM_FLOOR,
        gold = insights.gold_premium_share,
        gold_level = GOLD,
        premium = Tier::Premium.as_str(),
    );
    wrap_report(&text, settings.wrap_width)
}

/// Revenue per region and quantity per category, side by side.
pub fn build_figure(sales: &[EnrichedSale], settings: &InsightSettings, footer: &str) -> Result<Figure> {
    if sales.is_empty() {
        return Err(VizError::NoData("sales file has no rows".to_string()));
    }
    let cur = settings.currency.as_str();
    let mut fig = Figure::new(&settings.title, 1, 2).size(1100, 450);

    let per_region = group_sum(sales, |s| s.region.as_str(), |s| s.total);
    fig.push(
        Panel::new(
            "Total Revenue per Region",
            Cell::at(0, 0),
            PanelKind::Bar(
                Series::new(
                    "Revenue",
                    per_region.keys().cloned().collect(),
                    per_region.values().map(|v| to_f64(*v)).collect(),
                )
                .hover(
                    per_region
                        .iter()
                        .map(|(r, v)| format!("Region: {r}<br>Revenue: {}", money(*v, cur)))
                        .collect(),
                )
                .colors(vec![settings.bar_color.clone()]),
            ),
        )
        .axes("Region", &format!("Revenue ({cur})")),
    );

    let per_category = group_sum(sales, |s| s.category.as_str(), |s| Decimal::from(s.quantity));
    fig.push(
        Panel::new(
            "Orders per Category",
            Cell::at(0, 1),
            PanelKind::Bar(
                Series::new(
                    "Quantity",
                    per_category.keys().cloned().collect(),
                    per_category.values().map(|v| to_f64(*v)).collect(),
                )
                .hover(
                    per_category
                        .iter()
                        .map(|(c, q)| format!("Category: {c}<br>Units: {q}"))
                        .collect(),
                )
                .colors(vec![settings.bar_color.clone()]),
            ),
        )
        .axes("Category", "Units sold"),
    );

    if !footer.is_empty() {
        fig.footer = Some(footer.to_string());
    }
    Ok(fig)
}

/// Write enriched rows, highest total first.
pub fn export_csv(sales: &[EnrichedSale], path: &Path) -> Result<()> {
    let mut sorted: Vec<&EnrichedSale> = sales.iter().collect();
    sorted.sort_by(|a, b| b.total.cmp(&a.total));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut wtr = csv::Writer::from_path(path)?;
    for sale in sorted {
        wtr.serialize(sale)?;
    }
    wtr.flush()?;
    tracing::info!(path = %path.display(), rows = sales.len(), "exported enriched sales");
    Ok(())
}
