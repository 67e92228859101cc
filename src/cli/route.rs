//! CLI route: single route table and run context. Dispatches to the command,
//! the provider table and the config helpers.

use crate::cli::parse::{Cli, Commands, ConfigCommands};
use crate::cli::presentation::{format_provider_table, format_providers_json, format_schema_json};
use crate::command::{CommandOutcome, VocabularyCardCommand};
use crate::config::{
    global_config_path, write_default_config, ConfigLoader, ConfigOverrides, LexicardConfig,
};
use crate::error::ApiError;
use crate::host::TerminalHost;
use crate::provider::{BackendResolver, ProviderFactory, ProviderName};
use tracing::{debug, info};

/// What a command produced. Failures the command already reported to the
/// user come back as a non-zero exit code rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    pub output: String,
    pub exit_code: i32,
}

impl RunOutput {
    fn text(output: String) -> Self {
        Self {
            output,
            exit_code: 0,
        }
    }
}

/// Runtime context for CLI execution: the loaded configuration and the
/// backend resolver.
pub struct RunContext {
    config: LexicardConfig,
    resolver: Box<dyn BackendResolver>,
}

impl RunContext {
    /// Build from parsed arguments. Flags override every config source.
    pub fn new(cli: &Cli) -> Result<Self, ApiError> {
        let config = ConfigLoader::load(cli.config.as_deref(), &overrides_from(cli)?)?;
        Ok(Self::with_config(config, Box::new(ProviderFactory)))
    }

    pub fn with_config(config: LexicardConfig, resolver: Box<dyn BackendResolver>) -> Self {
        Self { config, resolver }
    }

    pub fn config(&self) -> &LexicardConfig {
        &self.config
    }

    pub fn execute(&self, command: &Commands) -> Result<RunOutput, ApiError> {
        match command {
            Commands::Define {
                word,
                tags,
                no_color,
            } => self.handle_define(word, tags.as_deref(), !*no_color),
            Commands::Providers { format } => match format.as_str() {
                "json" => Ok(RunOutput::text(format_providers_json()?)),
                "text" => Ok(RunOutput::text(format_provider_table())),
                other => Err(ApiError::ConfigError(format!(
                    "Invalid format: {} (must be 'text' or 'json')",
                    other
                ))),
            },
            Commands::Schema { provider } => {
                let provider = match provider {
                    Some(name) => name.parse::<ProviderName>()?,
                    None => self.config.settings.provider,
                };
                Ok(RunOutput::text(format_schema_json(provider)?))
            }
            Commands::Config { command } => self.handle_config(command),
        }
    }

    fn handle_define(
        &self,
        word: &str,
        tags: Option<&str>,
        color: bool,
    ) -> Result<RunOutput, ApiError> {
        let mut settings = self.config.settings.clone();
        if let Some(tags) = tags {
            settings.custom_tags = tags.to_string();
        }
        debug!(provider = %settings.provider, word = %word, "Running define");

        let host = TerminalHost::new(word, settings).with_color(color);
        let command = VocabularyCardCommand::new(self.resolver.as_ref());

        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| ApiError::ProviderError(format!("Failed to create runtime: {}", e)))?;

        match rt.block_on(command.run(&host)) {
            Ok(CommandOutcome::Generated { lines, .. }) => {
                info!(lines = lines.len(), "Card written");
                Ok(RunOutput::text(String::new()))
            }
            Ok(CommandOutcome::NoWord) => Ok(RunOutput::text(String::new())),
            // Already shown by the command.
            Err(_) => Ok(RunOutput {
                output: String::new(),
                exit_code: 1,
            }),
        }
    }

    fn handle_config(&self, command: &ConfigCommands) -> Result<RunOutput, ApiError> {
        match command {
            ConfigCommands::Init { force, path } => {
                let path = match path {
                    Some(path) => path.clone(),
                    None => global_config_path().ok_or_else(|| {
                        ApiError::ConfigError(
                            "Could not determine the config directory; pass --path".to_string(),
                        )
                    })?,
                };
                let written = write_default_config(&path, *force)?;
                Ok(RunOutput::text(format!(
                    "Wrote default configuration to {}",
                    written.display()
                )))
            }
            ConfigCommands::Path => match global_config_path() {
                Some(path) => Ok(RunOutput::text(path.display().to_string())),
                None => Err(ApiError::ConfigError(
                    "Could not determine the config directory".to_string(),
                )),
            },
        }
    }
}

fn overrides_from(cli: &Cli) -> Result<ConfigOverrides, ApiError> {
    let provider = cli
        .provider
        .as_deref()
        .map(str::parse::<ProviderName>)
        .transpose()?;
    let custom_tags = match &cli.command {
        Commands::Define { tags, .. } => tags.clone(),
        _ => None,
    };
    Ok(ConfigOverrides {
        provider,
        api_key: cli.api_key.clone(),
        base_url: cli.base_url.clone(),
        model_name: cli.model.clone(),
        custom_tags,
        log_level: cli.log_level.clone(),
        log_format: cli.log_format.clone(),
    })
}
