pub mod business;
pub mod categories;
pub mod completions;
pub mod demo;
pub mod expenses;
pub mod init;
pub mod insights;
pub mod summary;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use crate::render::OutputFormat;

#[derive(Parser)]
#[command(
    name = "dataviz",
    version,
    about = "Turns sales and bank-statement CSVs into multi-panel chart dashboards."
)]
pub struct Cli {
    /// Settings file (default: ~/.config/dataviz/settings.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Log debug details to stderr
    #[arg(long, global = true)]
    pub debug: bool,
    #[command(subcommand)]
    pub command: Commands,
}

/// Where and how to write a dashboard.
#[derive(Args, Debug, Clone)]
pub struct ChartArgs {
    /// Output file (format follows the extension unless --format is given)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the expenditure dashboard from a bank statement CSV.
    Expenses {
        /// Statement CSV
        file: PathBuf,
        #[command(flatten)]
        chart: ChartArgs,
        /// Chart net flows (credits included) instead of debits only
        #[arg(long)]
        include_credits: bool,
    },
    /// Build the four-panel business dashboard.
    Business {
        /// CSV with month, sales, satisfaction, ad_spend columns (default: built-in sample)
        #[arg(long)]
        file: Option<PathBuf>,
        #[command(flatten)]
        chart: ChartArgs,
    },
    /// Print the sales insights report and chart it.
    Insights {
        /// Sales CSV (date, customer, category, region, price, quantity)
        file: PathBuf,
        /// VIP list CSV (customer, vip_level)
        #[arg(long)]
        vip: Option<PathBuf>,
        #[command(flatten)]
        chart: ChartArgs,
        /// Also write the enriched rows to this CSV
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Print monthly and category totals for a statement.
    Summary {
        /// Statement CSV
        file: PathBuf,
        #[arg(long)]
        include_credits: bool,
    },
    /// Show the configured category keywords.
    Categories {
        /// Classify this description instead of listing the rules
        #[arg(long)]
        check: Option<String>,
    },
    /// Write the default settings file.
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },
    /// Write a sample bank statement to explore the dashboards.
    Demo {
        /// Directory to write into (default: current directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Print shell completions.
    Completions {
        shell: Shell,
    },
}
