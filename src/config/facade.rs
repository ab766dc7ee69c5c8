//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::NotaryConfig;
use config::ConfigError;
use std::path::{Path, PathBuf};

/// Values supplied on the command line; they take precedence over every source.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub source_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub factomd_url: Option<String>,
    pub walletd_url: Option<String>,
    pub ec_address: Option<String>,
    pub chain_id: Option<String>,
    pub poll_interval_secs: Option<u64>,
}

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the standard sources plus an optional explicit file.
    pub fn load(
        explicit: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<NotaryConfig, ConfigError> {
        MergeService::load(explicit, overrides)
    }

    /// Create default configuration.
    pub fn default() -> NotaryConfig {
        NotaryConfig::default()
    }
}
