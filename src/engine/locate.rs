use super::process::ProcessRunner;
use super::types::{Discovery, EngineHandle};
use crate::config::{self, DefaultPaths};
use crate::error::ConversionError;
use serde::{Deserialize, Serialize};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }
}

/// What the locator may observe about the host.
pub trait HostEnv {
    fn platform(&self) -> Platform;
    fn path_exists(&self, path: &Path) -> bool;
    fn var(&self, key: &str) -> Option<String>;
    /// True when `program --version` exits successfully.
    fn probe(&self, program: &str) -> bool;
}

impl<H: HostEnv + ?Sized> HostEnv for &H {
    fn platform(&self) -> Platform {
        (**self).platform()
    }

    fn path_exists(&self, path: &Path) -> bool {
        (**self).path_exists(path)
    }

    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }

    fn probe(&self, program: &str) -> bool {
        (**self).probe(program)
    }
}

pub struct SystemHost<R: ProcessRunner> {
    runner: R,
    probe_timeout: Duration,
}

impl<R: ProcessRunner> SystemHost<R> {
    pub fn new(runner: R, probe_timeout: Duration) -> Self {
        Self {
            runner,
            probe_timeout,
        }
    }
}

impl<R: ProcessRunner> HostEnv for SystemHost<R> {
    fn platform(&self) -> Platform {
        Platform::current()
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn probe(&self, program: &str) -> bool {
        let args = [OsString::from("--version")];
        self.runner
            .invoke(OsStr::new(program), &args, self.probe_timeout)
            .success()
    }
}

/// Read-only discovery inputs, fixed at construction.
#[derive(Debug, Clone)]
pub struct LocatorTable {
    pub default_paths: DefaultPaths,
    pub candidates: Vec<String>,
    pub env_override: String,
}

impl From<&config::Engine> for LocatorTable {
    fn from(cfg: &config::Engine) -> Self {
        Self {
            default_paths: cfg.default_paths.clone(),
            candidates: cfg.candidates.clone(),
            env_override: cfg.env_override.clone(),
        }
    }
}

pub type Strategy = fn(&LocatorTable, &dyn HostEnv) -> Option<EngineHandle>;

/// Evaluated in order; the first hit wins.
pub const DEFAULT_STRATEGIES: &[Strategy] =
    &[from_env_override, from_default_path, from_candidates];

pub fn from_env_override(table: &LocatorTable, env: &dyn HostEnv) -> Option<EngineHandle> {
    if table.env_override.is_empty() {
        return None;
    }
    let raw = env.var(&table.env_override)?;
    let path = PathBuf::from(raw.trim());
    if path.as_os_str().is_empty() || !env.path_exists(&path) {
        return None;
    }
    Some(EngineHandle::new(path, Discovery::EnvOverride))
}

pub fn from_default_path(table: &LocatorTable, env: &dyn HostEnv) -> Option<EngineHandle> {
    let path = table.default_paths.for_platform(env.platform())?;
    if env.path_exists(&path) {
        Some(EngineHandle::new(path, Discovery::DefaultPath))
    } else {
        None
    }
}

pub fn from_candidates(table: &LocatorTable, env: &dyn HostEnv) -> Option<EngineHandle> {
    table
        .candidates
        .iter()
        .find(|name| env.probe(name))
        .map(|name| EngineHandle::new(PathBuf::from(name), Discovery::Probed))
}

pub struct EngineLocator<H: HostEnv> {
    table: LocatorTable,
    host: H,
    strategies: Vec<Strategy>,
}

impl<H: HostEnv> EngineLocator<H> {
    pub fn new(table: LocatorTable, host: H) -> Self {
        Self::with_strategies(table, host, DEFAULT_STRATEGIES.to_vec())
    }

    pub fn with_strategies(table: LocatorTable, host: H, strategies: Vec<Strategy>) -> Self {
        Self {
            table,
            host,
            strategies,
        }
    }

    pub fn platform(&self) -> Platform {
        self.host.platform()
    }

    pub fn locate(&self) -> Result<EngineHandle, ConversionError> {
        debug!(platform = ?self.host.platform(), "locating conversion engine");
        for strategy in &self.strategies {
            if let Some(handle) = strategy(&self.table, &self.host) {
                info!(
                    "engine {} ({:?})",
                    handle.program.display(),
                    handle.discovery
                );
                return Ok(handle);
            }
        }
        Err(ConversionError::not_found())
    }
}
