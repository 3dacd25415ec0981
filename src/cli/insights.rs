use std::collections::HashMap;
use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::cli::ChartArgs;
use crate::error::Result;
use crate::importer::{load_sales, load_vip};
use crate::insights::{build_figure, enrich, export_csv, report, summarize};
use crate::render::write_figure;
use crate::settings::Settings;

/// "==== Sales Insights Summary ====" banner.
fn banner(title: &str) -> String {
    let bar = "=".repeat(20);
    format!("{bar} {title} {bar}")
}

pub fn run(
    settings: &Settings,
    file: &Path,
    vip: Option<PathBuf>,
    chart: ChartArgs,
    export: Option<PathBuf>,
) -> Result<()> {
    let rows = load_sales(file)?;
    let vip = match &vip {
        Some(path) => load_vip(path)?,
        None => HashMap::new(),
    };
    let sales = enrich(rows, &vip);
    let insights = summarize(&sales)?;

    println!("{}", banner(&settings.insights.title).bold());
    println!();
    println!("{}", report(&insights, &settings.insights));
    println!();

    let figure = build_figure(&sales, &settings.insights, &settings.footer)?;
    let path = write_figure(&figure, chart.output, chart.format, "sales_insights")?;
    println!("Saved {}", path.display());

    if let Some(out) = export {
        export_csv(&sales, &out)?;
        println!("Exported {} rows to {}", sales.len(), out.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner() {
        let b = banner("Sales Insights Summary");
        assert!(b.starts_with("===================="));
        assert!(b.contains(" Sales Insights Summary "));
        assert_eq!(b.len(), 20 * 2 + 2 + "Sales Insights Summary".len());
    }
}
