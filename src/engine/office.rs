use super::locate::{EngineLocator, HostEnv, LocatorTable, SystemHost};
use super::process::{ExitOutcome, ProcessRunner, SystemRunner};
use super::types::{Discovery, EngineDiag, EngineHandle};
use super::{expected_pdf, Engine};
use crate::config::{self, Config, EngineKind};
use crate::error::ConversionError;
use regex::Regex;
use std::cell::OnceCell;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

/// Drives an office suite (or a docx2pdf-style converter) as a subprocess.
///
/// The program is resolved on first use and cached, so a batch that never
/// converts anything never probes the host.
pub struct OfficeEngine<R: ProcessRunner, H: HostEnv> {
    cfg: config::Engine,
    runner: R,
    locator: EngineLocator<H>,
    resolved: OnceCell<Result<EngineHandle, ConversionError>>,
}

pub type SystemEngine = OfficeEngine<SystemRunner, SystemHost<SystemRunner>>;

impl SystemEngine {
    pub fn from_config(cfg: &Config) -> Self {
        let host = SystemHost::new(SystemRunner, cfg.engine.probe_timeout());
        OfficeEngine::new(&cfg.engine, SystemRunner, host)
    }
}

impl<R: ProcessRunner, H: HostEnv> OfficeEngine<R, H> {
    pub fn new(cfg: &config::Engine, runner: R, host: H) -> Self {
        Self {
            cfg: cfg.clone(),
            runner,
            locator: EngineLocator::new(LocatorTable::from(cfg), host),
            resolved: OnceCell::new(),
        }
    }

    pub fn engine(&self) -> Result<&EngineHandle, ConversionError> {
        self.resolved
            .get_or_init(|| self.resolve())
            .as_ref()
            .map_err(Clone::clone)
    }

    fn resolve(&self) -> Result<EngineHandle, ConversionError> {
        match self.cfg.kind {
            EngineKind::Auto => self.locator.locate(),
            EngineKind::Command => fixed(&self.cfg.command),
            EngineKind::Docx2pdf => fixed(&self.cfg.docx2pdf_command),
        }
    }

    fn args(&self, source: &Path, out_dir: &Path) -> Vec<OsString> {
        match self.cfg.kind {
            EngineKind::Auto | EngineKind::Command => vec![
                "--headless".into(),
                "--convert-to".into(),
                "pdf".into(),
                "--outdir".into(),
                out_dir.as_os_str().to_os_string(),
                source.as_os_str().to_os_string(),
            ],
            EngineKind::Docx2pdf => vec![
                source.as_os_str().to_os_string(),
                expected_pdf(source, out_dir).into_os_string(),
            ],
        }
    }

    fn version(&self, engine: &EngineHandle) -> Result<String, String> {
        let args = [OsString::from("--version")];
        let outcome = self
            .runner
            .invoke(engine.program.as_os_str(), &args, self.cfg.probe_timeout());
        match &outcome {
            ExitOutcome::Exited {
                success: true,
                stdout,
                ..
            } => {
                let text = String::from_utf8_lossy(stdout);
                Ok(parse_version(&text).unwrap_or_else(|| text.trim().to_string()))
            }
            _ => Err(format!("version query failed: {}", outcome.stderr_lossy())),
        }
    }
}

fn fixed(command: &str) -> Result<EngineHandle, ConversionError> {
    let command = command.trim();
    if command.is_empty() {
        return Err(ConversionError::not_found());
    }
    Ok(EngineHandle::new(PathBuf::from(command), Discovery::Fixed))
}

/// Pulls a dotted version number out of `--version` output.
pub fn parse_version(text: &str) -> Option<String> {
    let re = Regex::new(r"\b(\d+\.\d+(?:\.\d+)*)\b").ok()?;
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

impl<R: ProcessRunner, H: HostEnv> Engine for OfficeEngine<R, H> {
    fn doctor(&self) -> EngineDiag {
        let mut diag = EngineDiag {
            kind: format!("{:?}", self.cfg.kind).to_lowercase(),
            platform: format!("{:?}", self.locator.platform()),
            program: None,
            discovery: None,
            version: None,
            ok: false,
            error: None,
        };
        match self.engine() {
            Ok(engine) => {
                diag.program = Some(engine.program.display().to_string());
                diag.discovery = Some(engine.discovery);
                match self.version(engine) {
                    Ok(v) => {
                        diag.version = Some(v);
                        diag.ok = true;
                    }
                    Err(e) => diag.error = Some(e),
                }
            }
            Err(e) => diag.error = Some(e.to_string()),
        }
        diag
    }

    fn convert(&self, source: &Path, out_dir: &Path) -> Result<(), ConversionError> {
        let engine = self.engine()?;
        let args = self.args(source, out_dir);
        let started = Instant::now();

        let outcome = self
            .runner
            .invoke(engine.program.as_os_str(), &args, self.cfg.timeout());
        debug!(
            "engine {} finished in {:?} for {}",
            engine.program.display(),
            started.elapsed(),
            source.display()
        );

        match outcome {
            ExitOutcome::Exited { success: true, .. } => Ok(()),
            ExitOutcome::Exited { code, stderr, .. } => {
                let stderr = String::from_utf8_lossy(&stderr).trim().to_string();
                let status = code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string());
                warn!("engine exited with status {status} for {}", source.display());
                if stderr.is_empty() {
                    Err(ConversionError::Failed(format!(
                        "engine exited with status {status}"
                    )))
                } else {
                    Err(ConversionError::Failed(format!(
                        "engine exited with status {status}: {stderr}"
                    )))
                }
            }
            ExitOutcome::TimedOut { after, .. } => Err(ConversionError::Timeout {
                secs: after.as_secs(),
            }),
            ExitOutcome::InvokeError(msg) => Err(ConversionError::Failed(msg)),
        }
    }
}
