//! Config file named with `--config`; unlike the global file it must exist.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use config::FileFormat;
use std::path::Path;

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::Message(format!(
            "Config file not found: {}",
            path.display()
        )));
    }
    let path = dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    Ok(builder.add_source(File::from(path.as_path()).format(FileFormat::Toml)))
}
