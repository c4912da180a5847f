use std::io::{Cursor, Write};

use tcg_catalog_sources::{SourceError, read_archive, read_archive_from};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

fn write_archive(dir: &TempDir, entries: &[(&str, &str)]) -> std::path::PathBuf {
    let path = dir.path().join("sets.zip");
    let file = std::fs::File::create(&path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    for (name, body) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
    path
}

#[test]
fn reads_set_summaries() {
    let tmp = TempDir::new().unwrap();
    let path = write_archive(
        &tmp,
        &[(
            "sets/en.json",
            r#"[
                {"id": "base1", "name": "Base", "series": "Base", "printedTotal": 102,
                 "total": 102, "ptcgoCode": "BS", "releaseDate": "1999/01/09"},
                {"id": "basep", "name": "Wizards Black Star Promos", "series": "Base",
                 "printedTotal": 53, "total": 53}
            ]"#,
        )],
    );

    let catalog = read_archive(&path).unwrap();
    assert_eq!(catalog.source, "archive");
    assert_eq!(catalog.sets.len(), 2);

    let base = &catalog.sets[0];
    assert_eq!(base.names.get("en"), "Base");
    assert_eq!(base.series_names.get("en"), "Base");
    assert_eq!(base.platform_code, "BS");
    assert_eq!(base.official_count, Some(102));
    assert_eq!(base.total_count, Some(102));
    assert_eq!(base.release_date, "1999-01-09 00:00:00.000");

    assert_eq!(catalog.sets[1].platform_code, "");
}

#[test]
fn bad_entries_are_skipped() {
    let tmp = TempDir::new().unwrap();
    let path = write_archive(
        &tmp,
        &[
            ("broken.json", "{ not json"),
            ("README.txt", "ignored"),
            ("good.json", r#"[{"id": "jungle", "name": "Jungle"}]"#),
        ],
    );

    let catalog = read_archive(&path).unwrap();
    assert_eq!(catalog.sets.len(), 1);
    assert_eq!(catalog.sets[0].id, "jungle");
    assert_eq!(catalog.sets[0].official_count, None);
}

#[test]
fn entry_with_invalid_utf8_is_skipped() {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("bad.json", SimpleFileOptions::default()).unwrap();
    zip.write_all(&[0xff, 0xfe, b'[', b']']).unwrap();
    zip.start_file("good.json", SimpleFileOptions::default()).unwrap();
    zip.write_all(br#"[{"id": "fossil", "name": "Fossil"}]"#).unwrap();
    let bytes = zip.finish().unwrap().into_inner();

    let catalog = read_archive_from(Cursor::new(bytes)).unwrap();
    assert_eq!(catalog.sets.len(), 1);
    assert_eq!(catalog.sets[0].names.get("en"), "Fossil");
}

#[test]
fn missing_archive_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let err = read_archive(&tmp.path().join("missing.zip")).unwrap_err();
    assert!(matches!(err, SourceError::Io(_)));
}

#[test]
fn corrupt_container_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("sets.zip");
    std::fs::write(&path, b"definitely not a zip").unwrap();
    assert!(matches!(read_archive(&path).unwrap_err(), SourceError::Zip(_)));
}
