use wordpdf::document::{staging_name, UploadedDocument};

#[test]
fn strips_directories() {
    assert_eq!(staging_name("a/b/c.docx").as_deref(), Some("c.docx"));
    assert_eq!(staging_name("C:\\Users\\me\\memo.docx").as_deref(), Some("memo.docx"));
}

#[test]
fn rejects_empty_and_dot_names() {
    assert_eq!(staging_name(""), None);
    assert_eq!(staging_name("dir/"), None);
    assert_eq!(staging_name(".."), None);
    assert_eq!(staging_name("bad\u{0007}.docx"), None);
}

#[test]
fn normalizes_to_nfc() {
    let decomposed = "Informe_An\u{0303}o.docx";
    assert_eq!(staging_name(decomposed).as_deref(), Some("Informe_A\u{00f1}o.docx"));
}

#[test]
fn extension_checks_ignore_case() {
    let accepted = vec!["docx".to_string(), "odt".to_string()];
    assert!(UploadedDocument::new("A.DOCX", Vec::new()).has_extension(&accepted));
    assert!(UploadedDocument::new("b.odt", Vec::new()).has_extension(&accepted));
    assert!(!UploadedDocument::new("c.pdf", Vec::new()).has_extension(&accepted));
    assert!(!UploadedDocument::new("README", Vec::new()).has_extension(&accepted));
}

#[test]
fn reads_uploads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("carta.docx");
    std::fs::write(&path, b"PK\x03\x04").unwrap();

    let doc = UploadedDocument::from_path(&path).unwrap();
    assert_eq!(doc.name, "carta.docx");
    assert_eq!(doc.bytes, b"PK\x03\x04");
    assert!(UploadedDocument::from_path(&dir.path().join("missing.docx")).is_err());
}
