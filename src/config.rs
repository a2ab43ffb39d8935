use crate::engine::locate::Platform;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: Engine,
    #[serde(default)]
    pub batch: Batch,
    #[serde(default)]
    pub archive: Archive,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }

    /// Loads `path` when given, else `./wordpdf.toml` when present, else defaults.
    pub fn resolve(user: Option<&Path>) -> Result<Self> {
        if let Some(p) = user {
            return Self::load(p);
        }
        let default = PathBuf::from("wordpdf.toml");
        if default.exists() {
            Self::load(&default)
        } else {
            Ok(Self::default())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// Default install path, then a probe over candidate names.
    Auto,
    /// A fixed program, no discovery.
    Command,
    /// A converter taking explicit source and destination paths.
    Docx2pdf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Engine {
    pub kind: EngineKind,
    pub command: String,
    pub docx2pdf_command: String,
    pub timeout_seconds: u64,
    pub probe_timeout_seconds: u64,
    pub candidates: Vec<String>,
    pub env_override: String,
    pub default_paths: DefaultPaths,
}
impl Default for Engine {
    fn default() -> Self {
        Self {
            kind: EngineKind::Auto,
            command: "libreoffice".into(),
            docx2pdf_command: "docx2pdf".into(),
            timeout_seconds: 30,
            probe_timeout_seconds: 10,
            candidates: vec!["libreoffice".into(), "soffice".into(), "soffice.bin".into()],
            env_override: "WORDPDF_ENGINE".into(),
            default_paths: Default::default(),
        }
    }
}

impl Engine {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultPaths {
    pub linux: String,
    pub macos: String,
    pub windows: String,
}
impl Default for DefaultPaths {
    fn default() -> Self {
        Self {
            linux: "libreoffice".into(),
            macos: "/Applications/LibreOffice.app/Contents/MacOS/soffice".into(),
            windows: "C:\\Program Files\\LibreOffice\\program\\soffice.exe".into(),
        }
    }
}

impl DefaultPaths {
    pub fn for_platform(&self, platform: Platform) -> Option<PathBuf> {
        let raw = match platform {
            Platform::Linux => &self.linux,
            Platform::MacOs => &self.macos,
            Platform::Windows => &self.windows,
        };
        if raw.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(raw))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Batch {
    pub accepted_extensions: Vec<String>,
    pub reject_unknown_extensions: bool,
    pub scratch_dir: String,
    pub scratch_prefix: String,
}
impl Default for Batch {
    fn default() -> Self {
        Self {
            accepted_extensions: vec!["docx".into(), "doc".into(), "odt".into(), "rtf".into()],
            reject_unknown_extensions: false,
            scratch_dir: "".into(),
            scratch_prefix: "wordpdf-".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Archive {
    pub file_name: String,
    pub compression_level: Option<i64>,
}
impl Default for Archive {
    fn default() -> Self {
        Self {
            file_name: "converted_documents.zip".into(),
            compression_level: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub print_summary: bool,
    pub write_report_json: bool,
    pub report_filename: String,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            print_summary: true,
            write_report_json: false,
            report_filename: "report.json".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "wordpdf.log".into(),
        }
    }
}
