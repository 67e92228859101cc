//! Command entry point: the "Generate Vocabulary Card" slash command and the
//! plugin lifecycle hooks around it.

use crate::card::format_vocabulary_card;
use crate::error::ApiError;
use crate::generation::generate_vocabulary_card;
use crate::host::{BlockId, Host, Placement, Severity};
use crate::provider::BackendResolver;
use crate::settings::{settings_schema, Settings, SettingsChange};
use tracing::{error, info, warn};

pub const COMMAND_NAME: &str = "Generate Vocabulary Card";

/// How an invocation ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The current block was missing or blank; nothing was generated.
    NoWord,
    /// The card was written; `lines` is what went into the document.
    Generated { block: BlockId, lines: Vec<String> },
}

pub struct VocabularyCardCommand<'a> {
    resolver: &'a dyn BackendResolver,
}

impl<'a> VocabularyCardCommand<'a> {
    pub fn new(resolver: &'a dyn BackendResolver) -> Self {
        Self { resolver }
    }

    /// Run one invocation against `host`.
    ///
    /// Every failure is reported to the user exactly once before it is
    /// returned. Blocks already written stay in place.
    pub async fn run(&self, host: &dyn Host) -> Result<CommandOutcome, ApiError> {
        let block = match host.current_block().await? {
            Some(block) if !block.content.trim().is_empty() => block,
            _ => {
                host.show_message("No word found in current block", Severity::Warning)
                    .await?;
                return Ok(CommandOutcome::NoWord);
            }
        };
        let word = block.content.trim().to_string();

        match self.generate(host, &block.id, &word).await {
            Ok(lines) => {
                host.show_message("Vocabulary card generated!", Severity::Success)
                    .await?;
                info!(word = %word, lines = lines.len(), "Vocabulary card generated");
                Ok(CommandOutcome::Generated {
                    block: block.id,
                    lines,
                })
            }
            Err(err) => {
                error!(
                    word = %word,
                    backend = err.is_backend_error(),
                    error = %err,
                    "Failed to generate vocabulary card"
                );
                host.show_message(&failure_message(&err), Severity::Error)
                    .await?;
                Err(err)
            }
        }
    }

    async fn generate(
        &self,
        host: &dyn Host,
        block: &BlockId,
        word: &str,
    ) -> Result<Vec<String>, ApiError> {
        let settings = Settings::from_map(&host.settings().await?)?;
        settings.check()?;

        let client = self.resolver.resolve(&settings.provider_config())?;

        host.show_message(&format!("Generating card for \"{}\"...", word), Severity::Info)
            .await?;

        let definition = generate_vocabulary_card(client.as_ref(), word).await?;
        let lines = format_vocabulary_card(&definition, &settings.custom_tags);

        if let Some((first, rest)) = lines.split_first() {
            host.update_block(block, first).await?;
            for line in rest {
                host.insert_block(block, line, Placement::Child).await?;
            }
        }

        Ok(lines)
    }
}

/// Configuration problems carry their own remediation text; everything else is
/// prefixed so the user can tell it apart from a notice.
pub fn failure_message(err: &ApiError) -> String {
    match err {
        ApiError::ConfigError(message) => message.clone(),
        other => format!("Error: {}", other),
    }
}

/// Plugin lifecycle.
pub struct Plugin;

impl Plugin {
    /// Install the settings form for the currently selected provider.
    pub async fn ready(host: &dyn Host) -> Result<Settings, ApiError> {
        let settings = match Settings::from_map(&host.settings().await?) {
            Ok(settings) => settings,
            Err(err) => {
                warn!(error = %err, "Invalid plugin settings, using defaults");
                Settings::default()
            }
        };
        host.use_settings_schema(&settings_schema(settings.provider))
            .await?;
        info!(provider = %settings.provider, "Plugin ready");
        Ok(settings)
    }

    /// Swap the settings form when the provider selection changes.
    pub async fn settings_changed(
        host: &dyn Host,
        change: &SettingsChange,
    ) -> Result<bool, ApiError> {
        match change.schema_update() {
            Some(schema) => {
                info!(
                    provider = %change.new.provider,
                    "Provider changed, updating settings schema"
                );
                host.use_settings_schema(&schema).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
