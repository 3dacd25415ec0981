mod business;
mod categorizer;
mod chart;
mod cli;
mod dates;
mod error;
mod expenses;
mod fmt;
mod importer;
mod insights;
mod models;
mod render;
mod reports;
mod settings;

use clap::Parser;

use cli::{Cli, Commands};
use error::Result;

fn init_tracing(debug: bool) {
    let fallback = if debug { "dataviz=debug" } else { "dataviz=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    // These two never read settings, so a bad --config path cannot block them.
    match cli.command {
        Commands::Init { force } => {
            init_tracing(cli.debug);
            return cli::init::run(cli.config, force);
        }
        Commands::Completions { shell } => return cli::completions::run(shell),
        _ => {}
    }

    let settings = settings::load_settings(cli.config.as_deref())?;
    init_tracing(cli.debug || settings.debug);

    match cli.command {
        Commands::Expenses {
            file,
            chart,
            include_credits,
        } => cli::expenses::run(&settings, &file, chart, include_credits),
        Commands::Business { file, chart } => cli::business::run(&settings, file, chart),
        Commands::Insights {
            file,
            vip,
            chart,
            export,
        } => cli::insights::run(&settings, &file, vip, chart, export),
        Commands::Summary {
            file,
            include_credits,
        } => cli::summary::run(&settings, &file, include_credits),
        Commands::Categories { check } => cli::categories::run(&settings, check.as_deref()),
        Commands::Demo { dir } => cli::demo::run(dir),
        Commands::Init { .. } | Commands::Completions { .. } => Ok(()),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
