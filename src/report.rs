use crate::error::{ConversionError, ErrorKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Terminal result for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutcome {
    pub source_name: String,
    pub source_sha256: String,
    pub ok: bool,
    pub pdf_name: Option<String>,
    #[serde(skip)]
    pub pdf_path: Option<PathBuf>,
    pub error_kind: Option<ErrorKind>,
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

impl ConversionOutcome {
    pub fn success(source_name: &str, sha256: String, pdf_path: PathBuf, elapsed_ms: u64) -> Self {
        let pdf_name = pdf_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        Self {
            source_name: source_name.to_string(),
            source_sha256: sha256,
            ok: true,
            pdf_name,
            pdf_path: Some(pdf_path),
            error_kind: None,
            error: None,
            elapsed_ms,
        }
    }

    pub fn failure(
        source_name: &str,
        sha256: String,
        err: &ConversionError,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            source_name: source_name.to_string(),
            source_sha256: sha256,
            ok: false,
            pdf_name: None,
            pdf_path: None,
            error_kind: Some(err.kind()),
            error: Some(err.to_string()),
            elapsed_ms,
        }
    }

    pub fn status_line(&self) -> String {
        if self.ok {
            format!(
                "converted: {} -> {}",
                self.source_name,
                self.pdf_name.as_deref().unwrap_or("?")
            )
        } else {
            format!(
                "failed: {}: {}",
                self.source_name,
                self.error.as_deref().unwrap_or("unknown error")
            )
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub started: String,
    pub finished: String,
    pub warnings: Vec<String>,
    pub outcomes: Vec<ConversionOutcome>,
    pub archive_entries: Vec<String>,
}

impl BatchReport {
    pub fn converted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.ok).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.converted()
    }

    /// Batch warnings first, then one line per document in input order.
    pub fn status_lines(&self) -> Vec<String> {
        self.warnings
            .iter()
            .map(|w| format!("warning: {w}"))
            .chain(self.outcomes.iter().map(ConversionOutcome::status_line))
            .collect()
    }
}
