use std::path::Path;

use crate::cli::ChartArgs;
use crate::error::Result;
use crate::expenses::analyze;
use crate::importer::load_statement;
use crate::render::write_figure;
use crate::settings::Settings;

pub fn run(settings: &Settings, file: &Path, chart: ChartArgs, include_credits: bool) -> Result<()> {
    let load = load_statement(file, &settings.statement)?;
    let expenses = analyze(load, &settings.statement, include_credits)?;
    let figure = expenses.build_figure(&settings.statement, &settings.footer)?;
    let path = write_figure(&figure, chart.output, chart.format, "expenditure_overview")?;

    println!("Saved {}", path.display());
    if expenses.excluded > 0 {
        println!("  {} transaction(s) filtered out by exclusion words", expenses.excluded);
    }
    Ok(())
}
