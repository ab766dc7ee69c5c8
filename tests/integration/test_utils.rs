//! Shared fixtures for integration tests

use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Create a temporary directory holding `files` (relative path, content).
pub fn tree_with(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    write_files(dir.path(), files);
    dir
}

pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (relative, content) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}
