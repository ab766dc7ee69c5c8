//! Snapshot file format on disk

use dirnotary::error::StorageError;
use dirnotary::snapshot::{parse_snapshot, read_snapshot, write_snapshot};
use dirnotary::tree::hasher::hash_bytes;
use dirnotary::FileRecord;
use std::fs;
use tempfile::TempDir;

fn record(path: &str, content: &[u8]) -> FileRecord {
    FileRecord::new(path.to_string(), hash_bytes(content), content.len() as u64)
}

/// Paths with spaces survive a write and read
#[test]
fn test_paths_with_spaces() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("snap-1.log");
    let records = vec![record("./my file.txt", b"a"), record("./b", b"b")];

    write_snapshot(&records, &target).unwrap();
    let entries = read_snapshot(&target).unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].path, "./my file.txt");
    assert_eq!(&entries[0].digest, records[0].digest());
}

/// Rewriting the same target replaces it and leaves no temp file
#[test]
fn test_rewrite_replaces_file() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("snap-1.log");

    write_snapshot(&[record("./a", b"a"), record("./b", b"b")], &target).unwrap();
    write_snapshot(&[record("./c", b"c")], &target).unwrap();

    let entries = read_snapshot(&target).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].path, "./c");

    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers.len(), 1);
}

/// Truncated or hand-edited files are rejected with the offending line
#[test]
fn test_malformed_snapshot_reports_line() {
    let good = format!("{} ./a\n", "0".repeat(64));
    let bad = format!("{}{} ./b\n", good, "Z".repeat(64));

    match parse_snapshot(&bad) {
        Err(StorageError::MalformedSnapshot { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected a malformed snapshot error, got {:?}", other),
    }
}

/// Writing into a missing directory fails without creating it
#[test]
fn test_write_into_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("absent").join("snap-1.log");

    assert!(write_snapshot(&[record("./a", b"a")], &target).is_err());
    assert!(!dir.path().join("absent").exists());
}
