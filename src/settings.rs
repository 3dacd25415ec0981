use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::categorizer::CategoryRule;
use crate::error::{Result, VizError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Turn on debug-level logging without setting RUST_LOG.
    pub debug: bool,
    pub footer: String,
    pub statement: StatementSettings,
    pub business: BusinessSettings,
    pub insights: InsightSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            footer: "Visualized with dataviz".to_string(),
            statement: StatementSettings::default(),
            business: BusinessSettings::default(),
            insights: InsightSettings::default(),
        }
    }
}

/// Header names the statement loader requires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementColumns {
    pub date: String,
    pub description: String,
    pub amount: String,
}

impl Default for StatementColumns {
    fn default() -> Self {
        Self {
            date: "Trans. Date".to_string(),
            description: "Description".to_string(),
            amount: "Debit/Credit(\u{20a6})".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementSettings {
    pub title: String,
    pub currency: String,
    pub columns: StatementColumns,
    /// Data rows to drop right after the header (sample rows in some exports).
    pub skip_rows: usize,
    /// Rows whose description contains any of these are dropped before classifying.
    pub exclude: Vec<String>,
    /// Ordered rule list; the first matching rule wins.
    pub categories: Vec<CategoryRule>,
    pub default_category: String,
    /// Category drawn on its own in the outer donut ring.
    pub headline_category: String,
    pub month_colors: Vec<String>,
    pub category_colors: Vec<String>,
}

impl Default for StatementSettings {
    fn default() -> Self {
        Self {
            title: "Expenditure Overview".to_string(),
            currency: "\u{20a6}".to_string(),
            columns: StatementColumns::default(),
            skip_rows: 0,
            exclude: vec![
                "OWealth Withdrawal".to_string(),
                "Card".to_string(),
                "Save".to_string(),
            ],
            categories: vec![
                CategoryRule::new("Transfers", &["transfer to"]),
                CategoryRule::new("Mobile Data", &["mobile data"]),
                CategoryRule::new("Airtime", &["airtime"]),
                CategoryRule::new(
                    "Bills & Levies",
                    &["electricity", "sms", "electronic money transfer levy"],
                ),
            ],
            default_category: "Others".to_string(),
            headline_category: "Transfers".to_string(),
            month_colors: palette(&["red", "green", "#2986cc", "orange", "purple", "blue"]),
            category_colors: palette(&["#1f77b4", "purple", "#ff7f0e", "#F9D040", "#D27045"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessSettings {
    pub title: String,
    pub currency: String,
    pub line_color: String,
    pub marker_color: String,
    pub bar_color: String,
    pub scatter_color: String,
    pub annotation_color: String,
}

impl Default for BusinessSettings {
    fn default() -> Self {
        Self {
            title: "Business Dashboard Overview".to_string(),
            currency: "$".to_string(),
            line_color: "rgb(102, 225, 0)".to_string(),
            marker_color: "blue".to_string(),
            bar_color: "blue".to_string(),
            scatter_color: "rgb(255, 95, 0)".to_string(),
            annotation_color: "red".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightSettings {
    pub title: String,
    pub currency: String,
    pub wrap_width: usize,
    pub bar_color: String,
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            title: "Sales Insights Summary".to_string(),
            currency: "$".to_string(),
            wrap_width: 70,
            bar_color: "#1f77b4".to_string(),
        }
    }
}

fn palette(colors: &[&str]) -> Vec<String> {
    colors.iter().map(|c| c.to_string()).collect()
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("dataviz")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Load settings from `explicit` if given, else from the default location.
///
/// An explicit path must exist. A missing default file yields the built-in
/// defaults; fields absent from a file fall back to their defaults.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    let path = match explicit {
        Some(p) if !p.exists() => {
            return Err(VizError::Settings(format!("{} not found", p.display())));
        }
        Some(p) => p.to_path_buf(),
        None => settings_path(),
    };
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(&path)?;
    serde_json::from_str(&content)
        .map_err(|e| VizError::Settings(format!("{}: {e}", path.display())))
}

pub fn save_settings(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}
