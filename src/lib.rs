//! dirnotary: directory fingerprinting anchored to a public ledger.
//!
//! A directory tree is enumerated in a fixed order, each regular file is
//! hashed with SHA-256, and the per-file digests are folded into a Merkle
//! root. The record list is written to a `snap-<height>.log` file and the
//! root is published to a Factom chain whenever the ledger height advances.

pub mod cli;
pub mod config;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod scheduler;
pub mod snapshot;
pub mod tree;
pub mod types;

pub use error::{LedgerError, MerkleError, NotaryError, StorageError};
pub use scheduler::{Scheduler, TickOutcome};
pub use snapshot::{Fingerprinter, Snapshot};
pub use tree::{compute_root, FileRecord, MerkleTree, Walker};
pub use types::Digest;
