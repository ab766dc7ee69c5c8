//! Error types for the directory notary.

use std::path::PathBuf;
use thiserror::Error;

/// Filesystem and snapshot-format errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Permission denied: {0:?}")]
    PermissionDenied(PathBuf),

    #[error("Root directory not found: {0:?}")]
    RootNotFound(PathBuf),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Symbolic link rejected by policy: {0:?}")]
    SymlinkRejected(PathBuf),

    #[error("Malformed snapshot at line {line}: {reason}")]
    MalformedSnapshot { line: usize, reason: String },
}

impl StorageError {
    /// Attach a path to an I/O error, folding permission failures into their own variant.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            StorageError::PermissionDenied(path)
        } else {
            StorageError::Io { path, source }
        }
    }
}

/// Merkle aggregation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MerkleError {
    #[error("Cannot build a Merkle tree from zero leaves")]
    EmptyInput,
}

/// Ledger (height oracle and anchor) errors
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Ledger request failed: {0}")]
    Request(String),

    #[error("Ledger RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Invalid ledger response: {0}")]
    InvalidResponse(String),

    #[error("Entry payload of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Ledger call timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Top-level errors surfaced by cycles, startup, and the CLI
#[derive(Debug, Error)]
pub enum NotaryError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Merkle error: {0}")]
    Merkle(#[from] MerkleError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Startup failed: {0}")]
    Startup(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<config::ConfigError> for NotaryError {
    fn from(err: config::ConfigError) -> Self {
        NotaryError::Config(err.to_string())
    }
}
