//! Core types for the directory notary.

/// Digest: SHA-256 output over file content or a pair of child digests
pub type Digest = [u8; 32];

/// Length in bytes of every digest handled by the crate
pub const DIGEST_LEN: usize = 32;

/// Render a digest the way it appears in snapshot files and logs.
pub fn digest_hex(digest: &Digest) -> String {
    hex::encode(digest)
}

/// Parse a 64-character hex string back into a digest.
pub fn parse_digest_hex(s: &str) -> Option<Digest> {
    if s.len() != DIGEST_LEN * 2 {
        return None;
    }
    let bytes = hex::decode(s).ok()?;
    let mut digest = [0u8; DIGEST_LEN];
    digest.copy_from_slice(&bytes);
    Some(digest)
}
