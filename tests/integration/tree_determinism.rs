//! Integration tests for fingerprint determinism

use super::test_utils::{tree_with, write_files};
use dirnotary::tree::walker::{EnumerationOrder, WalkerConfig};
use dirnotary::{compute_root, Digest, Walker};
use std::fs;
use std::path::Path;

fn root_of(path: &Path) -> Digest {
    let records = Walker::new(path.to_path_buf()).enumerate().unwrap();
    let leaves: Vec<Digest> = records.iter().map(|r| *r.digest()).collect();
    compute_root(&leaves).unwrap()
}

/// Test that the same filesystem produces the same root hash
#[test]
fn test_same_filesystem_same_root() {
    let dir = tree_with(&[
        ("file1.txt", "content1"),
        ("file2.txt", "content2"),
        ("dir1/file3.txt", "content3"),
    ]);

    assert_eq!(root_of(dir.path()), root_of(dir.path()));
}

/// Test that file content changes produce different root hashes
#[test]
fn test_file_content_change_different_root() {
    let dir = tree_with(&[("test.txt", "content1")]);
    let root1 = root_of(dir.path());

    fs::write(dir.path().join("test.txt"), "content2").unwrap();

    assert_ne!(root1, root_of(dir.path()));
}

/// Test that file addition produces different root hash
#[test]
fn test_file_addition_different_root() {
    let dir = tree_with(&[("file1.txt", "content")]);
    let root1 = root_of(dir.path());

    write_files(dir.path(), &[("file2.txt", "content")]);

    assert_ne!(root1, root_of(dir.path()));
}

/// Empty directories contribute nothing to the root
#[test]
fn test_empty_directory_does_not_change_root() {
    let dir = tree_with(&[("file1.txt", "content")]);
    let root1 = root_of(dir.path());

    fs::create_dir(dir.path().join("empty")).unwrap();

    assert_eq!(root1, root_of(dir.path()));
}

/// Swapping the contents of two files reorders the leaves and changes the root
#[test]
fn test_swapped_contents_different_root() {
    let first = tree_with(&[("a", "x"), ("b", "y")]);
    let second = tree_with(&[("a", "y"), ("b", "x")]);

    assert_ne!(root_of(first.path()), root_of(second.path()));
}

/// Identical trees in different locations share a root: only content and order count
#[test]
fn test_root_independent_of_location() {
    let files = [("a.txt", "alpha"), ("sub/b.txt", "beta")];
    let first = tree_with(&files);
    let second = tree_with(&files);

    assert_eq!(root_of(first.path()), root_of(second.path()));
}

/// Ignored names are excluded from the record list
#[test]
fn test_ignored_directory_excluded() {
    let dir = tree_with(&[("keep.txt", "k"), (".git/HEAD", "ref")]);
    let config = WalkerConfig {
        ignore: vec![".git".to_string()],
        ..WalkerConfig::default()
    };

    let records = Walker::with_config(dir.path().to_path_buf(), config)
        .enumerate()
        .unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].path().ends_with("keep.txt"));
}

/// Listing order covers the same files as name order
#[test]
fn test_listing_order_same_file_set() {
    let dir = tree_with(&[("c", "3"), ("a", "1"), ("b", "2")]);
    let config = WalkerConfig {
        order: EnumerationOrder::Listing,
        ..WalkerConfig::default()
    };

    let mut listed: Vec<String> = Walker::with_config(dir.path().to_path_buf(), config)
        .enumerate()
        .unwrap()
        .iter()
        .map(|r| r.path().to_string())
        .collect();
    let sorted: Vec<String> = Walker::new(dir.path().to_path_buf())
        .enumerate()
        .unwrap()
        .iter()
        .map(|r| r.path().to_string())
        .collect();

    listed.sort();
    assert_eq!(listed, sorted);
}
