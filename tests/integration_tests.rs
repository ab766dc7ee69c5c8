//! Integration tests entry point
//!
//! Rust compiles each file in tests/ as its own test binary; this one pulls in
//! every module under integration/.

mod integration;
