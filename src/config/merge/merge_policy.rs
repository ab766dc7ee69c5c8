//! Merge rules: defaults, override order, conflict handling.

use crate::config::ConfigOverrides;
use crate::ledger::{default_chain_id, default_factomd_url, default_walletd_url};
use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("ledger.factomd_url", default_factomd_url())?
        .set_default("ledger.walletd_url", default_walletd_url())?
        .set_default("ledger.chain_id", default_chain_id())?
        .set_default("snapshot.source_dir", ".")?
        .set_default("snapshot.output_dir", ".")?
        .set_default("scheduler.poll_interval_secs", 60)?
        .set_default("scheduler.submit_timeout_secs", 120)
}

/// Apply command-line overrides last so they win over files and environment.
pub fn apply_overrides(
    builder: ConfigBuilder<DefaultState>,
    overrides: &ConfigOverrides,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path_value = |p: &Option<std::path::PathBuf>| {
        p.as_ref().map(|p| p.to_string_lossy().into_owned())
    };
    builder
        .set_override_option("snapshot.source_dir", path_value(&overrides.source_dir))?
        .set_override_option("snapshot.output_dir", path_value(&overrides.output_dir))?
        .set_override_option("ledger.factomd_url", overrides.factomd_url.clone())?
        .set_override_option("ledger.walletd_url", overrides.walletd_url.clone())?
        .set_override_option("ledger.ec_address", overrides.ec_address.clone())?
        .set_override_option("ledger.chain_id", overrides.chain_id.clone())?
        .set_override_option(
            "scheduler.poll_interval_secs",
            overrides
                .poll_interval_secs
                .map(|secs| i64::try_from(secs).unwrap_or(i64::MAX)),
        )
}
