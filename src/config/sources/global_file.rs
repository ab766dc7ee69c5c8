//! Global config file source: $XDG_CONFIG_HOME/dirnotary/config.toml on Linux,
//! the platform config directory elsewhere.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use config::FileFormat;
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::debug;

/// Path to global config file.
pub fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "dirnotary").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Add global config file source to builder if it exists.
pub fn add_to_builder(
    mut builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if let Some(path) = global_config_path() {
        if path.is_file() {
            let canonical = dunce::canonicalize(&path).unwrap_or_else(|_| path.clone());
            builder = builder.add_source(
                File::from(canonical.as_path())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        } else {
            debug!(config_path = %path.display(), "No global configuration file");
        }
    }
    Ok(builder)
}
