//! Snapshots: the ordered record list of one fingerprint cycle and its root
//!
//! The on-disk form is UTF-8 text with one `<hex digest> <path>\n` line per
//! record in aggregation order. The root digest is not stored in the file; it
//! is returned to the caller for anchoring and can be recomputed from the file.

use crate::error::{MerkleError, NotaryError, StorageError};
use crate::tree::hasher;
use crate::tree::merkle::MerkleTree;
use crate::tree::walker::{FileRecord, Walker, WalkerConfig};
use crate::types::{digest_hex, parse_digest_hex, Digest};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Result of one fingerprint cycle
#[derive(Debug, Clone)]
pub struct Snapshot {
    trigger_height: u64,
    records: Vec<FileRecord>,
    root_digest: Digest,
}

impl Snapshot {
    /// Aggregate records into a snapshot. Fails on an empty record list.
    pub fn from_records(trigger_height: u64, records: Vec<FileRecord>) -> Result<Self, MerkleError> {
        let leaves: Vec<Digest> = records.iter().map(|r| *r.digest()).collect();
        let tree = MerkleTree::build(&leaves)?;
        debug!(
            leaves = tree.leaf_count(),
            depth = tree.depth(),
            "Merkle tree built"
        );
        Ok(Self {
            trigger_height,
            records,
            root_digest: tree.root(),
        })
    }

    pub fn trigger_height(&self) -> u64 {
        self.trigger_height
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn root_digest(&self) -> &Digest {
        &self.root_digest
    }

    /// Sum of recorded file sizes
    pub fn total_bytes(&self) -> u64 {
        self.records.iter().map(FileRecord::size).sum()
    }
}

/// One parsed snapshot line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    pub digest: Digest,
    pub path: String,
}

impl From<&FileRecord> for SnapshotEntry {
    fn from(record: &FileRecord) -> Self {
        Self {
            digest: *record.digest(),
            path: record.path().to_string(),
        }
    }
}

/// File name for the snapshot taken when `trigger_height` closes.
///
/// Named after the block being opened, `snap-<height + 1>.log`.
pub fn snapshot_file_name(trigger_height: u64) -> String {
    format!("snap-{}.log", trigger_height.saturating_add(1))
}

/// Write records to `target`, replacing it atomically.
///
/// Lines go to a sibling `.tmp` file which is flushed and synced before being
/// renamed over the target. On failure the temporary file is removed and the
/// target is left as it was.
pub fn write_snapshot(records: &[FileRecord], target: &Path) -> Result<(), StorageError> {
    let file_name = target.file_name().ok_or_else(|| {
        StorageError::InvalidPath(format!("{} has no file name", target.display()))
    })?;
    if let Some(record) = records
        .iter()
        .find(|r| r.path().is_empty() || r.path().contains('\n'))
    {
        return Err(StorageError::InvalidPath(format!(
            "{:?} cannot be written as one snapshot line",
            record.path()
        )));
    }

    let mut temp_name = file_name.to_os_string();
    temp_name.push(".tmp");
    let temp_path = target.with_file_name(temp_name);

    if let Err(e) = write_lines(records, &temp_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(StorageError::io(&temp_path, e));
    }

    fs::rename(&temp_path, target).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        StorageError::io(target, e)
    })?;

    sync_parent_dir(target);
    Ok(())
}

fn write_lines(records: &[FileRecord], path: &Path) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for record in records {
        writeln!(writer, "{} {}", digest_hex(record.digest()), record.path())?;
    }
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()
}

#[cfg(unix)]
fn sync_parent_dir(target: &Path) {
    let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return;
    };
    if let Err(e) = File::open(parent).and_then(|dir| dir.sync_all()) {
        debug!(dir = %parent.display(), "Directory sync skipped: {}", e);
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_target: &Path) {}

/// Parse a snapshot file back into its `(digest, path)` pairs, in file order.
pub fn read_snapshot(path: &Path) -> Result<Vec<SnapshotEntry>, StorageError> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::InvalidData {
            StorageError::MalformedSnapshot {
                line: 0,
                reason: "file is not valid UTF-8".to_string(),
            }
        } else {
            StorageError::io(path, e)
        }
    })?;
    parse_snapshot(&content)
}

/// Parse snapshot text.
pub fn parse_snapshot(content: &str) -> Result<Vec<SnapshotEntry>, StorageError> {
    if content.is_empty() {
        return Ok(Vec::new());
    }
    let Some(body) = content.strip_suffix('\n') else {
        return Err(StorageError::MalformedSnapshot {
            line: content.split('\n').count(),
            reason: "missing trailing newline".to_string(),
        });
    };

    body.split('\n')
        .enumerate()
        .map(|(idx, line)| parse_line(line, idx + 1))
        .collect()
}

fn parse_line(line: &str, number: usize) -> Result<SnapshotEntry, StorageError> {
    let malformed = |reason: &str| StorageError::MalformedSnapshot {
        line: number,
        reason: reason.to_string(),
    };

    let (digest_part, path) = line
        .split_once(' ')
        .ok_or_else(|| malformed("expected `<digest> <path>`"))?;
    if digest_part.bytes().any(|b| b.is_ascii_uppercase()) {
        return Err(malformed("digest must be lowercase hex"));
    }
    let digest =
        parse_digest_hex(digest_part).ok_or_else(|| malformed("digest is not 64 hex characters"))?;
    if path.is_empty() {
        return Err(malformed("empty path"));
    }

    Ok(SnapshotEntry {
        digest,
        path: path.to_string(),
    })
}

/// Runs the enumerate, aggregate, write sequence for one cycle
#[derive(Debug, Clone, Default)]
pub struct Fingerprinter {
    config: WalkerConfig,
}

impl Fingerprinter {
    pub fn new(config: WalkerConfig) -> Self {
        Self { config }
    }

    /// Fingerprint `source` and write the record list to `target`.
    ///
    /// The snapshot file is only written once the root has been computed, so
    /// an enumeration or aggregation failure leaves no file behind.
    #[instrument(skip(self), fields(source = %source.display(), target = %target.display()))]
    pub fn create(
        &self,
        source: &Path,
        target: &Path,
        trigger_height: u64,
    ) -> Result<Snapshot, NotaryError> {
        let start = Instant::now();

        let records = Walker::with_config(source.to_path_buf(), self.config.clone()).enumerate()?;
        let snapshot = Snapshot::from_records(trigger_height, records)?;
        write_snapshot(snapshot.records(), target)?;

        info!(
            height = trigger_height,
            records = snapshot.records().len(),
            bytes = snapshot.total_bytes(),
            root = %digest_hex(snapshot.root_digest()),
            duration_ms = start.elapsed().as_millis(),
            "Snapshot written"
        );
        Ok(snapshot)
    }
}

/// Why a listed file no longer matches its snapshot line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mismatch {
    Missing { path: String },
    Changed { path: String, expected: String, actual: String },
    Unreadable { path: String, error: String },
}

/// Outcome of recomputing a snapshot's root
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub snapshot: PathBuf,
    pub entries: usize,
    pub root: String,
    pub rehashed: bool,
    pub mismatches: Vec<Mismatch>,
}

impl VerifyReport {
    /// True when no listed file disagreed with its line
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Recompute the Merkle root of a snapshot file.
///
/// With `rehash`, every listed path is hashed again and compared with its line.
pub fn verify_snapshot(path: &Path, rehash: bool) -> Result<VerifyReport, NotaryError> {
    let entries = read_snapshot(path)?;
    let leaves: Vec<Digest> = entries.iter().map(|e| e.digest).collect();
    let root = MerkleTree::build(&leaves)?.root();

    let mut mismatches = Vec::new();
    if rehash {
        for entry in &entries {
            if let Some(mismatch) = check_entry(entry) {
                warn!(path = %entry.path, "Snapshot entry does not match file");
                mismatches.push(mismatch);
            }
        }
    }

    Ok(VerifyReport {
        snapshot: path.to_path_buf(),
        entries: entries.len(),
        root: digest_hex(&root),
        rehashed: rehash,
        mismatches,
    })
}

fn check_entry(entry: &SnapshotEntry) -> Option<Mismatch> {
    match hasher::hash_file(Path::new(&entry.path)) {
        Ok((digest, _)) if digest == entry.digest => None,
        Ok((digest, _)) => Some(Mismatch::Changed {
            path: entry.path.clone(),
            expected: digest_hex(&entry.digest),
            actual: digest_hex(&digest),
        }),
        Err(StorageError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            Some(Mismatch::Missing {
                path: entry.path.clone(),
            })
        }
        Err(e) => Some(Mismatch::Unreadable {
            path: entry.path.clone(),
            error: e.to_string(),
        }),
    }
}
