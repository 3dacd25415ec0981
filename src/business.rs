use rust_decimal::Decimal;

use crate::chart::{Annotation, Cell, Figure, Panel, PanelKind, Ring, Series};
use crate::error::{Result, VizError};
use crate::fmt::{compact, to_f64};
use crate::models::BusinessMonth;
use crate::reports::peak_index;
use crate::settings::BusinessSettings;

const MONTHS: [&str; 6] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun"];
const LONG_MONTHS: [&str; 6] = ["January", "February", "March", "April", "May", "June"];
const SALES: [i64; 6] = [12000, 18000, 15000, 22000, 26000, 30000];
const SATISFACTION: [f64; 6] = [7.2, 8.0, 7.8, 8.5, 9.0, 9.2];
const AD_SPEND: [i64; 6] = [4000, 4200, 5000, 5200, 6000, 7000];

/// Share of the data span added above and below each y axis.
pub const Y_PADDING: f64 = 0.27;

/// Built-in half-year dataset used when no CSV is given.
pub fn demo_data() -> Vec<BusinessMonth> {
    (0..MONTHS.len())
        .map(|i| BusinessMonth {
            label: MONTHS[i].to_string(),
            long_name: LONG_MONTHS[i].to_string(),
            sales: Decimal::from(SALES[i]),
            satisfaction: SATISFACTION[i],
            ad_spend: Decimal::from(AD_SPEND[i]),
        })
        .collect()
}

/// `(min - pad, max + pad)` where `pad = (max - min) * padding`.
pub fn padded_range(values: &[f64], padding: f64) -> Option<(f64, f64)> {
    let min = values.iter().copied().reduce(f64::min)?;
    let max = values.iter().copied().reduce(f64::max)?;
    let pad = (max - min) * padding;
    Some((min - pad, max + pad))
}

/// "8.0" rather than "8", matching how the scale is usually written.
fn satisfaction_label(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}

pub fn peak_text(month: &BusinessMonth, currency: &str) -> String {
    format!("Sales peaked at {} in {}", compact(month.sales, currency), month.long_name)
}

pub fn build_figure(months: &[BusinessMonth], settings: &BusinessSettings, footer: &str) -> Result<Figure> {
    if months.is_empty() {
        return Err(VizError::NoData("business dataset has no months".to_string()));
    }
    let cur = settings.currency.as_str();
    let labels: Vec<String> = months.iter().map(|m| m.label.clone()).collect();
    let sales: Vec<f64> = months.iter().map(|m| to_f64(m.sales)).collect();
    let ads: Vec<f64> = months.iter().map(|m| to_f64(m.ad_spend)).collect();

    let mut fig = Figure::new(&settings.title, 1, 4).size(1300, 400);

    let sales_hover = months
        .iter()
        .map(|m| format!("Month: {}<br>Sales: {cur}{}", m.long_name, m.sales.normalize()))
        .collect();
    let mut sales_panel = Panel::new(
        "Monthly Sales Growth",
        Cell::at(0, 0),
        PanelKind::Line(
            Series::new("Monthly Sales Growth", labels.clone(), sales.clone())
                .hover(sales_hover)
                .colors(vec![settings.marker_color.clone()])
                .line_color(&settings.line_color),
        ),
    )
    .axes("Months", &format!("Sales ({cur})"));
    if let Some(range) = padded_range(&sales, Y_PADDING) {
        sales_panel = sales_panel.y_range(range);
    }
    let sales_idx = fig.push(sales_panel);

    let ad_hover = months
        .iter()
        .map(|m| format!("Month: {}<br>Ad expenses: {cur}{}", m.long_name, m.ad_spend.normalize()))
        .collect();
    let mut ad_panel = Panel::new(
        "Ad Spend by Month",
        Cell::at(0, 1),
        PanelKind::Bar(
            Series::new("Ad Spend", labels.clone(), ads.clone())
                .hover(ad_hover)
                .colors(vec![settings.bar_color.clone()]),
        ),
    )
    .axes("Months", &format!("Ads Expenditure ({cur})"));
    if let Some(range) = padded_range(&ads, Y_PADDING) {
        ad_panel = ad_panel.y_range(range);
    }
    fig.push(ad_panel);

    let sat_labels = months.iter().map(|m| satisfaction_label(m.satisfaction)).collect();
    let sat_hover = months
        .iter()
        .map(|m| {
            format!(
                "Satisfaction: {}<br>Sales: {cur}{}",
                satisfaction_label(m.satisfaction),
                m.sales.normalize()
            )
        })
        .collect();
    let mut sat_panel = Panel::new(
        "Customer Satisfaction",
        Cell::at(0, 2),
        PanelKind::Scatter(
            Series::new("Customer Satisfaction Level", sat_labels, sales.clone())
                .hover(sat_hover)
                .colors(vec![settings.scatter_color.clone()]),
        ),
    )
    .axes("Customer Satisfaction Level (scale: 1\u{2013}10)", &format!("Sales ({cur})"));
    if let Some(range) = padded_range(&sales, Y_PADDING) {
        sat_panel = sat_panel.y_range(range);
    }
    fig.push(sat_panel);

    let share_hover = months
        .iter()
        .map(|m| format!("Month: {}<br>Total sales: {cur}{}", m.long_name, m.sales.normalize()))
        .collect();
    fig.push(Panel::new(
        "Total Sales Percentage per Month",
        Cell::at(0, 3),
        PanelKind::Donut(vec![
            Ring::new("Monthly Sales Percentage", labels, sales).hover(share_hover)
        ]),
    ));

    if let Some(point) = peak_index(months.iter().map(|m| m.sales)) {
        tracing::debug!(month = %months[point].label, sales = %months[point].sales, "sales peak");
        fig.annotations.push(Annotation {
            panel: sales_idx,
            point,
            text: peak_text(&months[point], cur),
            color: settings.annotation_color.clone(),
        });
    }

    if !footer.is_empty() {
        fig.footer = Some(footer.to_string());
    }
    Ok(fig)
}
