pub mod html;
#[cfg(feature = "pdf")]
pub mod pdf;

use std::path::{Path, PathBuf};

use crate::chart::Figure;
use crate::error::{Result, VizError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Interactive page (Plotly.js)
    Html,
    /// Static landscape page
    Pdf,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Pdf => "pdf",
        }
    }

    /// `--format` wins, then the output extension, then HTML.
    pub fn resolve(explicit: Option<OutputFormat>, output: Option<&Path>) -> Result<OutputFormat> {
        if let Some(fmt) = explicit {
            return Ok(fmt);
        }
        let Some(ext) = output.and_then(|p| p.extension()).and_then(|e| e.to_str()) else {
            return Ok(Self::Html);
        };
        match ext.to_ascii_lowercase().as_str() {
            "html" | "htm" => Ok(Self::Html),
            "pdf" => Ok(Self::Pdf),
            other => Err(VizError::UnsupportedFormat(other.to_string())),
        }
    }
}

pub fn render(figure: &Figure, format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Html => Ok(html::render_html(figure)?.into_bytes()),
        #[cfg(feature = "pdf")]
        OutputFormat::Pdf => pdf::render_pdf(figure),
        #[cfg(not(feature = "pdf"))]
        OutputFormat::Pdf => Err(VizError::UnsupportedFormat(
            "pdf (built without the `pdf` feature)".to_string(),
        )),
    }
}

/// Render and write the figure; `output` defaults to `<stem>.<ext>` in the
/// working directory.
pub fn write_figure(
    figure: &Figure,
    output: Option<PathBuf>,
    format: Option<OutputFormat>,
    stem: &str,
) -> Result<PathBuf> {
    let format = OutputFormat::resolve(format, output.as_deref())?;
    let path = output.unwrap_or_else(|| PathBuf::from(format!("{stem}.{}", format.extension())));
    let bytes = render(figure, format)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, bytes)?;
    tracing::info!(path = %path.display(), ?format, "wrote chart");
    Ok(path)
}
