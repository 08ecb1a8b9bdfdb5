//! Persona context — the person being represented and their background text.
//!
//! Loaded once at startup; immutable afterwards.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

pub mod prompts;

pub use prompts::build_system_prompt;

#[derive(Debug, Error)]
pub enum PersonaError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to extract text from PDF {path}: {message}")]
    Pdf { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    pub name: String,
    pub summary: String,
    /// Text extracted from the LinkedIn profile export.
    pub profile: String,
}

impl Persona {
    /// Reads the summary and profile from disk.
    /// A `.pdf` profile goes through text extraction; anything else is read as UTF-8.
    pub fn load(
        name: impl Into<String>,
        profile_path: &Path,
        summary_path: &Path,
    ) -> Result<Self, PersonaError> {
        let summary = read_text(summary_path)?;
        let profile = if is_pdf(profile_path) {
            extract_pdf_text(profile_path)?
        } else {
            read_text(profile_path)?
        };

        info!(
            "Loaded persona: summary={} chars, profile={} chars",
            summary.len(),
            profile.len()
        );

        Ok(Self {
            name: name.into(),
            summary,
            profile,
        })
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn read_text(path: &Path) -> Result<String, PersonaError> {
    std::fs::read_to_string(path).map_err(|source| PersonaError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn extract_pdf_text(path: &Path) -> Result<String, PersonaError> {
    let bytes = std::fs::read(path).map_err(|source| PersonaError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    pdf_extract::extract_text_from_mem(&bytes).map_err(|e| PersonaError::Pdf {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
