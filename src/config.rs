//! Configuration System
//!
//! Layered configuration built once at startup: merge-policy defaults, the
//! global config file, an explicit `--config` file, `DIRNOTARY_*` environment
//! variables, then command-line overrides. The resulting `NotaryConfig` is
//! validated and handed to the scheduler by reference; nothing mutates it later.

use crate::logging::LoggingConfig;
use crate::tree::walker::{EnumerationOrder, SymlinkPolicy, WalkerConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub use crate::ledger::LedgerConfig;

mod facade;
mod merge;
mod sources;

pub use facade::{ConfigLoader, ConfigOverrides};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotaryConfig {
    /// Ledger endpoints and credential
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// What to fingerprint and where snapshots go
    #[serde(default)]
    pub snapshot: SnapshotConfig,

    /// Poll loop timing
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Snapshot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Directory to fingerprint
    #[serde(default = "default_dir")]
    pub source_dir: PathBuf,

    /// Directory receiving `snap-<height>.log` files
    #[serde(default = "default_dir")]
    pub output_dir: PathBuf,

    #[serde(default)]
    pub order: EnumerationOrder,

    #[serde(default)]
    pub symlinks: SymlinkPolicy,

    /// File or directory names left out of the fingerprint
    #[serde(default)]
    pub ignore: Vec<String>,
}

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            source_dir: default_dir(),
            output_dir: default_dir(),
            order: EnumerationOrder::default(),
            symlinks: SymlinkPolicy::default(),
            ignore: Vec::new(),
        }
    }
}

impl SnapshotConfig {
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig {
            order: self.order,
            symlinks: self.symlinks,
            ignore: self.ignore.clone(),
        }
    }

    /// Validate snapshot configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.source_dir.as_os_str().is_empty() {
            return Err("Source directory cannot be empty".to_string());
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err("Output directory cannot be empty".to_string());
        }
        if self.ignore.iter().any(|name| name.is_empty() || name.contains('/')) {
            return Err("Ignore entries must be plain file or directory names".to_string());
        }
        Ok(())
    }
}

/// Scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between height polls
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Upper bound on one anchor submission
    #[serde(default = "default_submit_timeout_secs")]
    pub submit_timeout_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_submit_timeout_secs() -> u64 {
    120
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            submit_timeout_secs: default_submit_timeout_secs(),
        }
    }
}

impl SchedulerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs)
    }

    /// Validate scheduler configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.poll_interval_secs == 0 {
            return Err("Poll interval must be greater than zero".to_string());
        }
        if self.submit_timeout_secs == 0 {
            return Err("Submit timeout must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Ledger(String),
    Snapshot(String),
    Scheduler(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Ledger(msg) => write!(f, "Ledger: {}", msg),
            ValidationError::Snapshot(msg) => write!(f, "Snapshot: {}", msg),
            ValidationError::Scheduler(msg) => write!(f, "Scheduler: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl NotaryConfig {
    /// Validate everything needed to fingerprint, without the ledger section
    pub fn validate_local(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if let Err(e) = self.snapshot.validate() {
            errors.push(ValidationError::Snapshot(e));
        }
        if let Err(e) = self.scheduler.validate() {
            errors.push(ValidationError::Scheduler(e));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = match self.validate_local() {
            Ok(()) => Vec::new(),
            Err(errors) => errors,
        };
        if let Err(e) = self.ledger.validate() {
            errors.push(ValidationError::Ledger(e));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Join validation errors into one message
pub fn format_validation_errors(errors: &[ValidationError]) -> String {
    let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    format!("Configuration validation failed:\n{}", msgs.join("\n"))
}
