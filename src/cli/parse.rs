//! CLI parse: clap types for dirnotary. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// dirnotary - Anchor directory fingerprints to the Factom ledger
#[derive(Parser)]
#[command(name = "dirnotary")]
#[command(version)]
#[command(about = "Fingerprint a directory tree and anchor its Merkle root on each ledger height advance")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config file)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory to fingerprint
    #[arg(long, global = true)]
    pub source_dir: Option<PathBuf>,

    /// Directory receiving snapshot files
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// factomd JSON-RPC endpoint
    #[arg(long, global = true)]
    pub factomd_url: Option<String>,

    /// factom-walletd JSON-RPC endpoint
    #[arg(long, global = true)]
    pub walletd_url: Option<String>,

    /// Entry-credit public address paying for entries
    #[arg(long, global = true)]
    pub ec_address: Option<String>,

    /// Chain receiving snapshot entries
    #[arg(long, global = true)]
    pub chain_id: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll the ledger and anchor a snapshot each time the height advances
    Run {
        /// Seconds between height polls
        #[arg(long)]
        poll_interval_secs: Option<u64>,
    },
    /// Write one snapshot and print its root without contacting the ledger
    Fingerprint {
        /// Height the snapshot file is named after (file is snap-<height+1>.log)
        #[arg(long, default_value = "0")]
        height: u64,
        /// Write the snapshot here instead of the output directory
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Recompute the root of a snapshot file
    Verify {
        /// Snapshot file to check
        snapshot: PathBuf,
        /// Hash every listed file again and report differences
        #[arg(long)]
        rehash: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the effective configuration as TOML
    Config,
}
