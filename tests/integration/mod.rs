//! Integration tests for fingerprinting and snapshot files

mod fingerprint_scenario;
mod snapshot_roundtrip;
mod test_utils;
mod tree_determinism;
