//! Directory enumerator: depth-first traversal producing ordered file records

use crate::error::StorageError;
use crate::tree::hasher;
use crate::types::{digest_hex, Digest};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument, trace};
use walkdir::{DirEntry, WalkDir};

/// One enumerated regular file with its content digest.
///
/// Built once per file per cycle and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    path: String,
    digest: Digest,
    size: u64,
}

impl FileRecord {
    pub fn new(path: String, digest: Digest, size: u64) -> Self {
        Self { path, digest, size }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Sibling ordering used while descending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EnumerationOrder {
    /// Siblings sorted bytewise by file name; platform independent
    #[default]
    FileName,
    /// Whatever order the filesystem listing reports; may differ across
    /// platforms and between reads of the same directory
    Listing,
}

/// What to do with symbolic links found under the root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SymlinkPolicy {
    /// Leave links out of the snapshot
    #[default]
    Skip,
    /// Hash link targets and descend into linked directories; cycles are errors
    Follow,
    /// Abort the enumeration when a link is found
    Error,
}

/// Directory enumerator configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalkerConfig {
    #[serde(default)]
    pub order: EnumerationOrder,
    #[serde(default)]
    pub symlinks: SymlinkPolicy,
    /// Exact file or directory names pruned wherever they appear
    #[serde(default)]
    pub ignore: Vec<String>,
}

/// Directory enumerator
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
}

impl Walker {
    /// Create a walker with the default configuration
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            config: WalkerConfig::default(),
        }
    }

    /// Create a walker with custom configuration
    pub fn with_config(root: PathBuf, config: WalkerConfig) -> Self {
        Self { root, config }
    }

    /// Enumerate every regular file under the root and hash it.
    ///
    /// Traversal is depth-first on walkdir's explicit stack. The returned order
    /// is the order files were reached, which the Merkle root depends on.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn enumerate(&self) -> Result<Vec<FileRecord>, StorageError> {
        let start = Instant::now();
        self.check_root()?;

        let mut walker = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(self.config.symlinks == SymlinkPolicy::Follow);
        if self.config.order == EnumerationOrder::FileName {
            walker = walker.sort_by_file_name();
        }

        let mut records = Vec::new();
        let mut entries = walker.into_iter();
        // Canonical paths already reached; only populated when following links
        let mut visited: HashSet<PathBuf> = HashSet::new();
        if self.config.symlinks == SymlinkPolicy::Follow {
            visited.insert(canonical(&self.root)?);
        }

        while let Some(entry) = entries.next() {
            let entry = entry.map_err(map_walk_error)?;

            if self.is_ignored(&entry) {
                trace!(path = %entry.path().display(), "Ignored");
                if entry.file_type().is_dir() {
                    entries.skip_current_dir();
                }
                continue;
            }

            if entry.path_is_symlink() {
                match self.config.symlinks {
                    SymlinkPolicy::Skip => {
                        debug!(path = %entry.path().display(), "Skipping symbolic link");
                        continue;
                    }
                    SymlinkPolicy::Error => {
                        return Err(StorageError::SymlinkRejected(entry.path().to_path_buf()));
                    }
                    SymlinkPolicy::Follow => {}
                }
            }

            let file_type = entry.file_type();
            if self.config.symlinks == SymlinkPolicy::Follow
                && (file_type.is_dir() || file_type.is_file())
                && !visited.insert(canonical(entry.path())?)
            {
                debug!(path = %entry.path().display(), "Already visited through another link");
                if file_type.is_dir() {
                    entries.skip_current_dir();
                }
                continue;
            }
            if file_type.is_dir() {
                continue;
            }
            if !file_type.is_file() {
                // FIFOs, sockets and device nodes can block or never end
                debug!(path = %entry.path().display(), "Skipping special file");
                continue;
            }

            records.push(hash_entry(entry.path())?);
        }

        info!(
            records = records.len(),
            duration_ms = start.elapsed().as_millis(),
            "Enumeration completed"
        );
        Ok(records)
    }

    fn check_root(&self) -> Result<(), StorageError> {
        match std::fs::metadata(&self.root) {
            Ok(metadata) if metadata.is_dir() => Ok(()),
            Ok(_) => Err(StorageError::InvalidPath(format!(
                "{} is not a directory",
                self.root.display()
            ))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::RootNotFound(self.root.clone()))
            }
            Err(e) => Err(StorageError::io(&self.root, e)),
        }
    }

    fn is_ignored(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        self.config.ignore.iter().any(|pattern| *pattern == name)
    }
}

fn canonical(path: &Path) -> Result<PathBuf, StorageError> {
    dunce::canonicalize(path).map_err(|e| StorageError::io(path, e))
}

/// Drop a leading `./` so a root of `.` records `a/b` rather than `./a/b`
fn strip_current_dir(path: &Path) -> &Path {
    path.strip_prefix(".").unwrap_or(path)
}

fn hash_entry(path: &Path) -> Result<FileRecord, StorageError> {
    let rendered = render_path(strip_current_dir(path))?;
    let (digest, size) = hasher::hash_file(path)?;
    trace!(path = %rendered, digest = %digest_hex(&digest), size, "Hashed file");
    Ok(FileRecord::new(rendered, digest, size))
}

/// Render a path for the line-oriented snapshot format.
///
/// Snapshot files are UTF-8 with one record per line, so paths that are not
/// valid UTF-8 or that contain a newline cannot be written unambiguously.
pub fn render_path(path: &Path) -> Result<String, StorageError> {
    let s = path.to_str().ok_or_else(|| {
        StorageError::InvalidPath(format!("{} is not valid UTF-8", path.display()))
    })?;
    if s.contains('\n') {
        return Err(StorageError::InvalidPath(format!(
            "{:?} contains a newline",
            s
        )));
    }
    Ok(s.to_string())
}

fn map_walk_error(err: walkdir::Error) -> StorageError {
    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
    if let Some(ancestor) = err.loop_ancestor() {
        return StorageError::InvalidPath(format!(
            "Symbolic link loop at {} (points back to {})",
            path.display(),
            ancestor.display()
        ));
    }
    match err.into_io_error() {
        Some(io) => StorageError::io(path, io),
        None => StorageError::InvalidPath(format!("Failed to walk {}", path.display())),
    }
}
