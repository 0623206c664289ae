//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod process;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use airinv_core::models::config::AirinvConfig;
use airinv_core::pdf::PdfTextExtractor;
use airinv_core::RawDocument;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("airinv")
        .join("config.json")
}

/// The explicit config file, else the default one if it exists, else the
/// built-in defaults. The result is validated.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<AirinvConfig> {
    let config = match config_path {
        Some(path) => AirinvConfig::from_file(Path::new(path))?,
        None => {
            let default_path = default_config_path();
            if default_path.exists() {
                debug!("Using config at {}", default_path.display());
                AirinvConfig::from_file(&default_path)?
            } else {
                AirinvConfig::default()
            }
        }
    };
    config.validate()?;
    Ok(config)
}

/// Whether the file is something `read_document` understands.
pub fn is_supported(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    matches!(ext.to_lowercase().as_str(), "pdf" | "txt")
}

/// Read a PDF (or an already extracted `.txt`) into a pipeline document.
///
/// A PDF that cannot be opened becomes a document without text, so the
/// pipeline reports it like any other unreadable file.
pub fn read_document(path: &Path, config: &AirinvConfig) -> anyhow::Result<RawDocument> {
    let filename = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_string();

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "txt" => {
            let text = fs::read_to_string(path)?;
            Ok(RawDocument::new(filename, &text))
        }
        "pdf" => {
            let data = fs::read(path)?;
            let mut extractor = PdfTextExtractor::from_config(&config.pdf);
            match extractor.read_document(&filename, &data) {
                Ok(doc) => Ok(doc),
                Err(e) => {
                    warn!("Failed to read {}: {}", path.display(), e);
                    Ok(RawDocument::new(filename, ""))
                }
            }
        }
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    }
}
