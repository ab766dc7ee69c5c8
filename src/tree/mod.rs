//! Directory Merkle fingerprint
//!
//! Enumerates a directory tree into ordered file records, hashes each file's
//! content, and folds the digests into a single root.

pub mod hasher;
pub mod merkle;
pub mod walker;

pub use merkle::{compute_root, MerkleNode, MerkleTree};
pub use walker::{EnumerationOrder, FileRecord, SymlinkPolicy, Walker, WalkerConfig};
