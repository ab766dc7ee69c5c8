//! End-to-end fingerprint cycles against real directories

use super::test_utils::{tree_with, write_files};
use dirnotary::snapshot::{read_snapshot, snapshot_file_name, verify_snapshot, Fingerprinter};
use dirnotary::tree::hasher::{hash_bytes, hash_pair};
use dirnotary::types::digest_hex;
use dirnotary::{MerkleError, NotaryError};
use std::fs;
use tempfile::TempDir;

const HELLO: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

/// Two files produce a two-line snapshot and H(H(a)||H(b)) as root
#[test]
fn test_two_file_cycle() {
    let source = tree_with(&[("a.txt", "hello"), ("b.txt", "world")]);
    let output = TempDir::new().unwrap();
    let target = output.path().join(snapshot_file_name(6));

    let snapshot = Fingerprinter::default()
        .create(source.path(), &target, 6)
        .unwrap();

    let expected_root = hash_pair(&hash_bytes(b"hello"), &hash_bytes(b"world"));
    assert_eq!(snapshot.root_digest(), &expected_root);
    assert_eq!(target.file_name().unwrap(), "snap-7.log");

    let content = fs::read_to_string(&target).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with(HELLO));
    assert!(lines[0].ends_with("a.txt"));
    assert!(lines[1].ends_with("b.txt"));
}

/// Three files: the trailing node is promoted, not duplicated
#[test]
fn test_odd_file_count_promotes_last_leaf() {
    let source = tree_with(&[("a", "1"), ("b", "2"), ("c", "3")]);
    let output = TempDir::new().unwrap();
    let target = output.path().join("snap.log");

    let snapshot = Fingerprinter::default()
        .create(source.path(), &target, 0)
        .unwrap();

    let (a, b, c) = (hash_bytes(b"1"), hash_bytes(b"2"), hash_bytes(b"3"));
    assert_eq!(snapshot.root_digest(), &hash_pair(&hash_pair(&a, &b), &c));
    assert_ne!(
        snapshot.root_digest(),
        &hash_pair(&hash_pair(&a, &b), &hash_pair(&c, &c))
    );
}

/// Adding a file changes the root and lands as an extra line
#[test]
fn test_new_file_changes_next_snapshot() {
    let source = tree_with(&[("a.txt", "hello"), ("b.txt", "world")]);
    let output = TempDir::new().unwrap();
    let fingerprinter = Fingerprinter::default();

    let first = fingerprinter
        .create(source.path(), &output.path().join(snapshot_file_name(6)), 6)
        .unwrap();
    write_files(source.path(), &[("c.txt", "earth")]);
    let second = fingerprinter
        .create(source.path(), &output.path().join(snapshot_file_name(7)), 7)
        .unwrap();

    assert_ne!(first.root_digest(), second.root_digest());
    assert_eq!(second.records().len(), 3);
    let entries = read_snapshot(&output.path().join("snap-8.log")).unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries[2].path.ends_with("c.txt"));
}

/// Rewriting one file changes the root and only that file's line
#[test]
fn test_changed_file_changes_root_not_sibling_digest() {
    let source = tree_with(&[("a.txt", "hello"), ("b.txt", "world")]);
    let output = TempDir::new().unwrap();
    let fingerprinter = Fingerprinter::default();

    let first = fingerprinter
        .create(source.path(), &output.path().join(snapshot_file_name(6)), 6)
        .unwrap();
    write_files(source.path(), &[("b.txt", "earth")]);
    let second = fingerprinter
        .create(source.path(), &output.path().join(snapshot_file_name(7)), 7)
        .unwrap();

    assert_ne!(first.root_digest(), second.root_digest());
    assert_eq!(
        second.root_digest(),
        &hash_pair(&hash_bytes(b"hello"), &hash_bytes(b"earth"))
    );
    assert_eq!(first.records()[0].digest(), &hash_bytes(b"hello"));
    assert_eq!(second.records()[0].digest(), &hash_bytes(b"hello"));
    assert_ne!(first.records()[1].digest(), second.records()[1].digest());

    let content = fs::read_to_string(output.path().join("snap-8.log")).unwrap();
    assert!(content.lines().next().unwrap().starts_with(HELLO));
}

/// Nested directories are walked depth-first before later siblings
#[test]
fn test_nested_directories_depth_first() {
    let source = tree_with(&[("a/x", "1"), ("a/y/z", "2"), ("b", "3")]);
    let output = TempDir::new().unwrap();
    let target = output.path().join("snap.log");

    let snapshot = Fingerprinter::default()
        .create(source.path(), &target, 0)
        .unwrap();

    let names: Vec<String> = snapshot
        .records()
        .iter()
        .map(|r| {
            r.path()
                .strip_prefix(source.path().to_str().unwrap())
                .unwrap()
                .to_string()
        })
        .collect();
    assert_eq!(names, vec!["/a/x", "/a/y/z", "/b"]);
}

/// An empty tree fails the cycle and writes nothing
#[test]
fn test_empty_tree_writes_nothing() {
    let source = TempDir::new().unwrap();
    fs::create_dir(source.path().join("empty")).unwrap();
    let output = TempDir::new().unwrap();
    let target = output.path().join("snap-1.log");

    let err = Fingerprinter::default()
        .create(source.path(), &target, 0)
        .unwrap_err();

    assert!(matches!(err, NotaryError::Merkle(MerkleError::EmptyInput)));
    assert!(!target.exists());
}

/// A written snapshot verifies to the root the cycle reported
#[test]
fn test_snapshot_verifies_to_cycle_root() {
    let source = tree_with(&[("one", "1"), ("two", "2"), ("dir/three", "3")]);
    let output = TempDir::new().unwrap();
    let target = output.path().join("snap-3.log");

    let snapshot = Fingerprinter::default()
        .create(source.path(), &target, 2)
        .unwrap();
    let report = verify_snapshot(&target, true).unwrap();

    assert_eq!(report.root, digest_hex(snapshot.root_digest()));
    assert_eq!(report.entries, 3);
    assert!(report.is_clean());
}
