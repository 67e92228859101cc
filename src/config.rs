//! Configuration System
//!
//! Runtime configuration for the `lexicard` binary. Hosts embedding the
//! command hand their settings store over directly; the CLI builds the same
//! [`Settings`] snapshot from layered sources:
//!
//! 1. defaults
//! 2. the global file (`<config dir>/lexicard/config.toml`)
//! 3. an explicit `--config` file
//! 4. environment (`LEXICARD__SETTINGS__API_KEY`, ...)
//! 5. command-line flags
//!
//! Config files use snake_case keys (`api_key`, `base_url`, `model_name`,
//! `custom_tags`); camelCase keys from the host store are accepted too.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::provider::ProviderName;
use crate::settings::{Settings, DEFAULT_CUSTOM_TAGS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

mod merge {
    pub mod merge_policy;
}
mod sources {
    pub mod environment;
    pub mod explicit_file;
    pub mod global_file;
}

pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LexicardConfig {
    /// Plugin settings, same shape as the host store
    #[serde(default)]
    pub settings: Settings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Values given on the command line. They win over every other source.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub provider: Option<ProviderName>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model_name: Option<String>,
    pub custom_tags: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all layers, using the global file in the
    /// platform config directory.
    pub fn load(
        explicit_path: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<LexicardConfig, ApiError> {
        let global = global_config_path();
        Self::load_layered(global.as_deref(), explicit_path, overrides)
    }

    /// Load configuration with the global file location given explicitly.
    pub fn load_layered(
        global_path: Option<&Path>,
        explicit_path: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<LexicardConfig, ApiError> {
        let mut builder = merge::merge_policy::builder_with_defaults()?;
        builder = sources::global_file::add_to_builder(builder, global_path)?;
        if let Some(path) = explicit_path {
            builder = sources::explicit_file::add_to_builder(builder, path)?;
        }
        builder = sources::environment::add_to_builder(builder);

        builder = builder
            .set_override_option("settings.provider", overrides.provider.map(|p| p.as_str()))?
            .set_override_option("settings.api_key", overrides.api_key.clone())?
            .set_override_option("settings.base_url", overrides.base_url.clone())?
            .set_override_option("settings.model_name", overrides.model_name.clone())?
            .set_override_option("settings.custom_tags", overrides.custom_tags.clone())?
            .set_override_option("logging.level", overrides.log_level.clone())?
            .set_override_option("logging.format", overrides.log_format.clone())?;

        let config: LexicardConfig = builder.build()?.try_deserialize()?;
        debug!(provider = %config.settings.provider, "Configuration loaded");
        Ok(config)
    }

    /// Load a single file on top of the defaults, ignoring every other source.
    pub fn load_from_file(path: &Path) -> Result<LexicardConfig, ApiError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::explicit_file::add_to_builder(builder, path)?;
        Ok(builder.build()?.try_deserialize()?)
    }
}

/// Render the default config file.
pub fn default_config_toml() -> Result<String, ApiError> {
    let defaults = ProviderName::Google.defaults();

    let mut settings = toml::Table::new();
    settings.insert("provider".into(), ProviderName::Google.as_str().into());
    settings.insert("api_key".into(), "".into());
    settings.insert("base_url".into(), "".into());
    settings.insert("model_name".into(), "".into());
    settings.insert("custom_tags".into(), DEFAULT_CUSTOM_TAGS.into());

    let logging = toml::Value::try_from(LoggingConfig::default())
        .map_err(|e| ApiError::ConfigError(format!("Failed to render logging config: {}", e)))?;

    let mut root = toml::Table::new();
    root.insert("settings".into(), toml::Value::Table(settings));
    root.insert("logging".into(), logging);

    let body = toml::to_string_pretty(&root)
        .map_err(|e| ApiError::ConfigError(format!("Failed to render config: {}", e)))?;

    Ok(format!(
        "# lexicard configuration\n\
         # Empty base_url and model_name use the provider defaults\n\
         # (google: {} / {}).\n\n{}",
        defaults.base_url.unwrap_or("-"),
        defaults.model.unwrap_or("-"),
        body
    ))
}

/// Write the default config file to `path`. Refuses to overwrite an existing
/// file unless `force` is set.
pub fn write_default_config(path: &Path, force: bool) -> Result<PathBuf, ApiError> {
    if path.exists() && !force {
        return Err(ApiError::ConfigError(format!(
            "Config file already exists at {}; use --force to overwrite",
            path.display()
        )));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            ApiError::ConfigError(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }
    std::fs::write(path, default_config_toml()?).map_err(|e| {
        ApiError::ConfigError(format!("Failed to write {}: {}", path.display(), e))
    })?;
    Ok(path.to_path_buf())
}
