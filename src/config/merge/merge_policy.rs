//! Merge rules: defaults, override order, conflict handling.
//!
//! Later sources win: defaults, global file, explicit file, environment,
//! then command-line overrides.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("settings.provider", "google")?
        .set_default("logging.level", "warn")?
        .set_default("logging.output", "stderr")
}
