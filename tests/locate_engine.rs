use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use wordpdf::config;
use wordpdf::engine::locate::{from_candidates, from_default_path};
use wordpdf::engine::{Discovery, EngineLocator, HostEnv, LocatorTable, Platform};
use wordpdf::error::ErrorKind;

struct FakeHost {
    platform: Platform,
    files: HashSet<PathBuf>,
    vars: HashMap<String, String>,
    working: HashSet<String>,
    probes: RefCell<Vec<String>>,
}

impl FakeHost {
    fn new(platform: Platform) -> Self {
        Self {
            platform,
            files: HashSet::new(),
            vars: HashMap::new(),
            working: HashSet::new(),
            probes: RefCell::new(Vec::new()),
        }
    }
}

impl HostEnv for FakeHost {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn path_exists(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn probe(&self, program: &str) -> bool {
        self.probes.borrow_mut().push(program.to_string());
        self.working.contains(program)
    }
}

fn table() -> LocatorTable {
    LocatorTable::from(&config::Engine::default())
}

#[test]
fn default_path_wins_without_probing() {
    let mut host = FakeHost::new(Platform::MacOs);
    host.files
        .insert(PathBuf::from("/Applications/LibreOffice.app/Contents/MacOS/soffice"));
    host.working.insert("soffice".into());

    let locator = EngineLocator::new(table(), &host);
    let handle = locator.locate().expect("engine");
    assert_eq!(handle.discovery, Discovery::DefaultPath);
    assert_eq!(
        handle.program,
        PathBuf::from("/Applications/LibreOffice.app/Contents/MacOS/soffice")
    );
    assert!(host.probes.borrow().is_empty());
}

#[test]
fn falls_back_to_first_working_candidate_in_order() {
    let mut host = FakeHost::new(Platform::Windows);
    host.working.insert("soffice".into());
    host.working.insert("soffice.bin".into());

    let locator = EngineLocator::new(table(), &host);
    let handle = locator.locate().expect("engine");
    assert_eq!(handle.program, PathBuf::from("soffice"));
    assert_eq!(handle.discovery, Discovery::Probed);
    assert_eq!(*host.probes.borrow(), vec!["libreoffice", "soffice"]);
}

#[test]
fn other_platform_paths_are_ignored() {
    let mut host = FakeHost::new(Platform::Linux);
    host.files
        .insert(PathBuf::from("C:\\Program Files\\LibreOffice\\program\\soffice.exe"));

    let locator = EngineLocator::new(table(), &host);
    assert!(locator.locate().is_err());
}

#[test]
fn env_override_is_checked_first() {
    let mut host = FakeHost::new(Platform::Linux);
    host.vars
        .insert("WORDPDF_ENGINE".into(), "/opt/lo/soffice".into());
    host.files.insert(PathBuf::from("/opt/lo/soffice"));
    host.working.insert("libreoffice".into());

    let handle = EngineLocator::new(table(), &host).locate().expect("engine");
    assert_eq!(handle.discovery, Discovery::EnvOverride);
    assert_eq!(handle.program, PathBuf::from("/opt/lo/soffice"));
}

#[test]
fn env_override_pointing_nowhere_is_skipped() {
    let mut host = FakeHost::new(Platform::Linux);
    host.vars
        .insert("WORDPDF_ENGINE".into(), "/missing/soffice".into());
    host.working.insert("soffice.bin".into());

    let handle = EngineLocator::new(table(), &host).locate().expect("engine");
    assert_eq!(handle.program, PathBuf::from("soffice.bin"));
}

#[test]
fn nothing_found_reports_engine_not_found() {
    let host = FakeHost::new(Platform::Linux);
    let err = EngineLocator::new(table(), &host).locate().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EngineNotFound);
    assert!(err.to_string().contains("PATH"));
    assert_eq!(host.probes.borrow().len(), 3);
}

#[test]
fn custom_strategy_order() {
    let mut host = FakeHost::new(Platform::MacOs);
    host.files
        .insert(PathBuf::from("/Applications/LibreOffice.app/Contents/MacOS/soffice"));
    host.working.insert("libreoffice".into());

    let locator =
        EngineLocator::with_strategies(table(), &host, vec![from_candidates, from_default_path]);
    let handle = locator.locate().expect("engine");
    assert_eq!(handle.discovery, Discovery::Probed);
}
