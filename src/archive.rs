use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const ZIP_MIME: &str = "application/zip";

/// The in-memory ZIP offered for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultArchive {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
    pub entries: Vec<String>,
}

/// Packs each file under its own base name, deflated. `None` when there is
/// nothing to pack.
pub fn build_archive(cfg: &Config, pdf_paths: &[PathBuf]) -> Result<Option<ResultArchive>> {
    if pdf_paths.is_empty() {
        return Ok(None);
    }

    let mut options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    if let Some(level) = cfg.archive.compression_level {
        options = options.compression_level(Some(level));
    }

    let mut buf = Vec::new();
    let mut entries = Vec::with_capacity(pdf_paths.len());
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buf));
        for path in pdf_paths {
            let name = entry_name(path)?;
            let data = std::fs::read(path)
                .with_context(|| format!("reading converted PDF: {}", path.display()))?;
            zip.start_file(name.as_str(), options)
                .with_context(|| format!("starting ZIP entry {name}"))?;
            zip.write_all(&data)
                .with_context(|| format!("writing ZIP entry {name}"))?;
            entries.push(name);
        }
        zip.finish().with_context(|| "finalizing ZIP")?;
    }

    Ok(Some(ResultArchive {
        file_name: cfg.archive.file_name.clone(),
        mime: ZIP_MIME,
        bytes: buf,
        entries,
    }))
}

fn entry_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("PDF path has no file name: {}", path.display()))
}
