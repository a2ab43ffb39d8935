use crate::{
    archive::{self, ResultArchive},
    config::Config,
    document::{staging_name, UploadedDocument},
    engine::{expected_pdf, Engine},
    error::ConversionError,
    report::{BatchReport, ConversionOutcome},
    util::{ensure_dir, now_rfc3339, sha256_hex},
};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::TempDir;
use tracing::{debug, info, warn};

pub const EMPTY_BATCH_WARNING: &str = "no documents to convert; add at least one Word file";

pub struct Pipeline<E: Engine> {
    cfg: Config,
    engine: E,
}

pub struct BatchOutput {
    pub report: BatchReport,
    pub archive: Option<ResultArchive>,
}

impl<E: Engine> Pipeline<E> {
    pub fn new(cfg: &Config, engine: E) -> Self {
        Self {
            cfg: cfg.clone(),
            engine,
        }
    }

    /// Converts every document in order. Per-document failures become failure
    /// outcomes; only setting up the scratch workspace or packing the archive
    /// can fail the whole batch.
    pub fn run_batch(&self, documents: &[UploadedDocument]) -> Result<BatchOutput> {
        let started = now_rfc3339();

        if documents.is_empty() {
            warn!("{EMPTY_BATCH_WARNING}");
            return Ok(BatchOutput {
                report: BatchReport {
                    started,
                    finished: now_rfc3339(),
                    warnings: vec![EMPTY_BATCH_WARNING.to_string()],
                    outcomes: Vec::new(),
                    archive_entries: Vec::new(),
                },
                archive: None,
            });
        }

        let workspace = self.scratch_workspace()?;
        info!(
            "batch of {} document(s) in {}",
            documents.len(),
            workspace.path().display()
        );

        let mut claimed = HashSet::new();
        let outcomes: Vec<ConversionOutcome> = documents
            .iter()
            .map(|doc| self.convert_one(doc, workspace.path(), &mut claimed))
            .collect();

        let pdf_paths: Vec<PathBuf> = outcomes
            .iter()
            .filter_map(|o| o.pdf_path.clone())
            .collect();
        let archive = archive::build_archive(&self.cfg, &pdf_paths);

        let workspace_path = workspace.path().to_path_buf();
        if let Err(e) = workspace.close() {
            warn!(
                "failed to remove scratch workspace {}: {e}",
                workspace_path.display()
            );
        }

        let archive = archive.with_context(|| "building result archive")?;
        let report = BatchReport {
            started,
            finished: now_rfc3339(),
            warnings: Vec::new(),
            archive_entries: archive
                .as_ref()
                .map(|a| a.entries.clone())
                .unwrap_or_default(),
            outcomes,
        };
        info!(
            "batch done converted={} failed={}",
            report.converted(),
            report.failed()
        );

        Ok(BatchOutput { report, archive })
    }

    /// Reads `inputs` from disk and converts them as one batch. An input that
    /// cannot be read takes a failure outcome in its slot.
    pub fn run_inputs(&self, inputs: &[PathBuf]) -> Result<BatchOutput> {
        let mut documents = Vec::with_capacity(inputs.len());
        let mut unreadable: Vec<Option<ConversionOutcome>> = Vec::with_capacity(inputs.len());
        for path in inputs {
            match UploadedDocument::from_path(path) {
                Ok(doc) => {
                    documents.push(doc);
                    unreadable.push(None);
                }
                Err(e) => {
                    warn!("{e:#}");
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string());
                    let err = ConversionError::Failed(format!("{e:#}"));
                    unreadable.push(Some(ConversionOutcome::failure(
                        &name,
                        String::new(),
                        &err,
                        0,
                    )));
                }
            }
        }

        if documents.is_empty() && !inputs.is_empty() {
            let started = now_rfc3339();
            return Ok(BatchOutput {
                report: BatchReport {
                    started,
                    finished: now_rfc3339(),
                    warnings: Vec::new(),
                    outcomes: unreadable.into_iter().flatten().collect(),
                    archive_entries: Vec::new(),
                },
                archive: None,
            });
        }

        let mut output = self.run_batch(&documents)?;
        let mut converted = std::mem::take(&mut output.report.outcomes).into_iter();
        output.report.outcomes = unreadable
            .into_iter()
            .filter_map(|slot| slot.or_else(|| converted.next()))
            .collect();
        Ok(output)
    }

    fn scratch_workspace(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(&self.cfg.batch.scratch_prefix);
        if self.cfg.batch.scratch_dir.is_empty() {
            builder
                .tempdir()
                .with_context(|| "creating scratch workspace")
        } else {
            let parent = Path::new(&self.cfg.batch.scratch_dir);
            ensure_dir(parent)?;
            builder
                .tempdir_in(parent)
                .with_context(|| format!("creating scratch workspace in {}", parent.display()))
        }
    }

    fn convert_one(
        &self,
        doc: &UploadedDocument,
        dir: &Path,
        claimed: &mut HashSet<String>,
    ) -> ConversionOutcome {
        let started = Instant::now();
        let sha = sha256_hex(&doc.bytes);
        let result = self.stage_and_convert(doc, dir, claimed);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(pdf) => {
                info!("converted {} -> {}", doc.name, pdf.display());
                ConversionOutcome::success(&doc.name, sha, pdf, elapsed_ms)
            }
            Err(err) => {
                warn!("{}: {err}", doc.name);
                ConversionOutcome::failure(&doc.name, sha, &err, elapsed_ms)
            }
        }
    }

    fn stage_and_convert(
        &self,
        doc: &UploadedDocument,
        dir: &Path,
        claimed: &mut HashSet<String>,
    ) -> Result<PathBuf, ConversionError> {
        let name = staging_name(&doc.name)
            .ok_or_else(|| ConversionError::Failed(format!("unusable file name {:?}", doc.name)))?;

        if !doc.has_extension(&self.cfg.batch.accepted_extensions) {
            if self.cfg.batch.reject_unknown_extensions {
                return Err(ConversionError::Failed(format!(
                    "unsupported extension; expected one of {:?}",
                    self.cfg.batch.accepted_extensions
                )));
            }
            warn!("{} has an unrecognized extension; trying anyway", doc.name);
        }

        let source = dir.join(&name);
        let expected = expected_pdf(&source, dir);
        // Keyed case-insensitively: macOS and Windows scratch dirs fold case.
        let source_key = folded_name(&source);
        let expected_key = folded_name(&expected);
        if source_key == expected_key {
            return Err(ConversionError::Failed("input is already a PDF".to_string()));
        }
        if claimed.contains(&source_key) || !claimed.insert(expected_key) {
            return Err(ConversionError::Failed(format!(
                "another document in this batch already produces {}",
                expected.file_name().unwrap_or_default().to_string_lossy()
            )));
        }
        claimed.insert(source_key);

        std::fs::write(&source, &doc.bytes)
            .map_err(|e| ConversionError::Failed(format!("staging {name}: {e}")))?;
        debug!("staged {} ({} bytes)", source.display(), doc.bytes.len());

        self.engine.convert(&source, dir)?;

        if !expected.is_file() {
            return Err(ConversionError::Failed(format!(
                "engine reported success but no PDF was produced for {name}"
            )));
        }
        Ok(expected)
    }
}

fn folded_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
