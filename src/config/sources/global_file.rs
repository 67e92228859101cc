//! Global config file source: `<config dir>/lexicard/config.toml`
//! (`$XDG_CONFIG_HOME` on Linux, `~/Library/Application Support` on macOS).

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use directories::BaseDirs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path to global config file.
pub fn global_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.config_dir().join("lexicard").join("config.toml"))
}

/// Add the global config file to the builder if it exists. A missing file is
/// not an error; the CLI works from defaults and flags alone.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    path: Option<&Path>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let Some(path) = path else {
        return Ok(builder);
    };
    if !path.exists() {
        debug!(config_path = %path.display(), "No global configuration file");
        return Ok(builder);
    }
    Ok(builder.add_source(File::from(path.to_path_buf()).required(false)))
}
