use std::path::PathBuf;

use crate::business::{build_figure, demo_data};
use crate::cli::ChartArgs;
use crate::error::Result;
use crate::importer::load_business;
use crate::render::write_figure;
use crate::settings::Settings;

pub fn run(settings: &Settings, file: Option<PathBuf>, chart: ChartArgs) -> Result<()> {
    let months = match &file {
        Some(path) => load_business(path)?,
        None => demo_data(),
    };
    let figure = build_figure(&months, &settings.business, &settings.footer)?;
    let path = write_figure(&figure, chart.output, chart.format, "business_dashboard")?;
    println!("Saved {}", path.display());
    Ok(())
}
