use std::io::Cursor;
use tempfile::TempDir;
use wordpdf::archive::build_archive;
use wordpdf::config::Config;

#[test]
fn entries_use_base_names_only() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("deep").join("er");
    std::fs::create_dir_all(&nested).unwrap();
    let a = dir.path().join("a.pdf");
    let b = nested.join("b.pdf");
    std::fs::write(&a, b"%PDF-1.7 a").unwrap();
    std::fs::write(&b, b"%PDF-1.7 b").unwrap();

    let cfg = Config::default();
    let archive = build_archive(&cfg, &[a, b]).unwrap().expect("archive");
    assert_eq!(archive.entries, vec!["a.pdf", "b.pdf"]);

    let mut zip = zip::ZipArchive::new(Cursor::new(archive.bytes)).unwrap();
    assert_eq!(zip.len(), 2);
    for i in 0..zip.len() {
        let entry = zip.by_index(i).unwrap();
        assert!(!entry.name().contains('/'));
        assert_eq!(entry.compression(), zip::CompressionMethod::Deflated);
    }
}

#[test]
fn nothing_to_pack_means_no_archive() {
    let cfg = Config::default();
    assert!(build_archive(&cfg, &[]).unwrap().is_none());
}

#[test]
fn unreadable_pdf_is_an_error() {
    let dir = TempDir::new().unwrap();
    let cfg = Config::default();
    let err = build_archive(&cfg, &[dir.path().join("gone.pdf")]).unwrap_err();
    assert!(format!("{err:#}").contains("gone.pdf"));
}

#[test]
fn configured_file_name_and_level() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.pdf");
    std::fs::write(&a, vec![b'x'; 4096]).unwrap();

    let mut cfg = Config::default();
    cfg.archive.file_name = "documentos_convertidos.zip".into();
    cfg.archive.compression_level = Some(9);
    let archive = build_archive(&cfg, &[a]).unwrap().expect("archive");
    assert_eq!(archive.file_name, "documentos_convertidos.zip");
    assert!(archive.bytes.len() < 4096);
}
