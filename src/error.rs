use thiserror::Error;

#[derive(Error, Debug)]
pub enum VizError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Missing expected column '{column}' in {file}")]
    MissingColumn { column: String, file: String },

    #[error("Unrecognized date: '{0}'")]
    InvalidDate(String),

    #[error("Invalid amount '{value}' on row {row}")]
    InvalidAmount { row: usize, value: String },

    #[error("Invalid {field} '{value}' on row {row}")]
    InvalidNumber {
        field: &'static str,
        row: usize,
        value: String,
    },

    #[error("No data to chart: {0}")]
    NoData(String),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, VizError>;
