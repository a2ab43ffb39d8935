pub mod locate;
pub mod office;
pub mod process;
pub mod types;

use crate::error::ConversionError;
use std::path::{Path, PathBuf};

pub use locate::{EngineLocator, HostEnv, LocatorTable, Platform, SystemHost};
pub use office::{OfficeEngine, SystemEngine};
pub use process::{ExitOutcome, ProcessRunner, SystemRunner};
pub use types::{Discovery, EngineDiag, EngineHandle};

pub trait Engine {
    fn doctor(&self) -> EngineDiag;
    /// Writes `<stem>.pdf` for `source` into `out_dir`. A returned `Ok` is not
    /// proof the file exists.
    fn convert(&self, source: &Path, out_dir: &Path) -> Result<(), ConversionError>;
}

impl<E: Engine + ?Sized> Engine for &E {
    fn doctor(&self) -> EngineDiag {
        (**self).doctor()
    }

    fn convert(&self, source: &Path, out_dir: &Path) -> Result<(), ConversionError> {
        (**self).convert(source, out_dir)
    }
}

/// Where a converter is expected to leave the PDF for `source`.
pub fn expected_pdf(source: &Path, out_dir: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "document".into());
    let mut name = stem;
    name.push(".pdf");
    out_dir.join(name)
}
