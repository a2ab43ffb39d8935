use anyhow::{anyhow, Context, Result};
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

/// A named document as received from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("reading input: {}", path.display()))?;
        let name = path
            .file_name()
            .ok_or_else(|| anyhow!("input has no file name: {}", path.display()))?
            .to_string_lossy()
            .into_owned();
        Ok(Self { name, bytes })
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
    }

    pub fn has_extension(&self, accepted: &[String]) -> bool {
        match self.extension() {
            Some(ext) => accepted.iter().any(|a| a.eq_ignore_ascii_case(&ext)),
            None => false,
        }
    }
}

/// Reduces an uploaded name to a bare NFC file name safe to write into the
/// scratch workspace. Returns `None` when nothing usable is left.
pub fn staging_name(raw: &str) -> Option<String> {
    let normalized: String = raw.nfc().collect();
    let base = normalized
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .trim();
    if base.is_empty() || base == "." || base == ".." {
        return None;
    }
    if base.chars().any(|c| c.is_control()) {
        return None;
    }
    Some(base.to_string())
}
