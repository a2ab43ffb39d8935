use wordpdf::config::{Config, EngineKind};
use wordpdf::engine::Platform;

#[test]
fn parse_example_config() {
    let raw = include_str!("../wordpdf.example.toml");
    let cfg: Config = toml::from_str(raw).expect("parse TOML");
    assert_eq!(cfg.engine.kind, EngineKind::Auto);
    assert_eq!(cfg.engine.timeout_seconds, 30);
    assert_eq!(
        cfg.engine.candidates,
        vec!["libreoffice", "soffice", "soffice.bin"]
    );
    assert_eq!(cfg.archive.file_name, "converted_documents.zip");
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let raw = "[engine]\nkind = \"docx2pdf\"\ntimeout_seconds = 5\n";
    let cfg: Config = toml::from_str(raw).expect("parse TOML");
    assert_eq!(cfg.engine.kind, EngineKind::Docx2pdf);
    assert_eq!(cfg.engine.timeout().as_secs(), 5);
    assert_eq!(cfg.engine.docx2pdf_command, "docx2pdf");
    assert_eq!(cfg.engine.candidates.len(), 3);
    assert!(cfg.batch.accepted_extensions.contains(&"docx".to_string()));
    assert!(!cfg.batch.reject_unknown_extensions);
}

#[test]
fn partial_nested_table_keeps_other_defaults() {
    let raw = "[engine.default_paths]\nlinux = \"/opt/libreoffice/program/soffice\"\n";
    let cfg: Config = toml::from_str(raw).expect("parse TOML");
    assert_eq!(cfg.engine.default_paths.linux, "/opt/libreoffice/program/soffice");
    assert!(cfg.engine.default_paths.macos.ends_with("MacOS/soffice"));
    assert_eq!(cfg.engine.timeout_seconds, 30);
}

#[test]
fn default_paths_per_platform() {
    let cfg = Config::default();
    let paths = &cfg.engine.default_paths;
    assert_eq!(
        paths.for_platform(Platform::MacOs).unwrap().to_str().unwrap(),
        "/Applications/LibreOffice.app/Contents/MacOS/soffice"
    );
    assert!(paths
        .for_platform(Platform::Windows)
        .unwrap()
        .to_str()
        .unwrap()
        .ends_with("soffice.exe"));
}
