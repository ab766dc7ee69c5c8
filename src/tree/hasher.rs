//! Hash computation for file content and Merkle nodes using SHA-256

use crate::error::StorageError;
use crate::types::Digest;
use sha2::{Digest as _, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Hash a file's byte content
///
/// Streams the file through SHA-256 so large files are never held in memory.
/// Returns the digest and the number of bytes actually read, which is the
/// size recorded for the file (the size seen at hashing time, not at listing time).
pub fn hash_file(path: &Path) -> Result<(Digest, u64), StorageError> {
    let file = File::open(path).map_err(|e| StorageError::io(path, e))?;
    let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];
    let mut total: u64 = 0;

    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(StorageError::io(path, e)),
        };
        hasher.update(&buffer[..n]);
        total += n as u64;
    }

    Ok((hasher.finalize().into(), total))
}

/// Hash an in-memory byte slice
pub fn hash_bytes(data: &[u8]) -> Digest {
    Sha256::digest(data).into()
}

/// Hash two child digests into their parent: H(left || right)
pub fn hash_pair(left: &Digest, right: &Digest) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}
