use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discovery {
    EnvOverride,
    DefaultPath,
    Probed,
    Fixed,
}

/// A program that can be invoked to convert documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineHandle {
    pub program: PathBuf,
    pub discovery: Discovery,
}

impl EngineHandle {
    pub fn new(program: PathBuf, discovery: Discovery) -> Self {
        Self { program, discovery }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineDiag {
    pub kind: String,
    pub platform: String,
    pub program: Option<String>,
    pub discovery: Option<Discovery>,
    pub version: Option<String>,
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}
