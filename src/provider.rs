//! Model Provider Abstraction
//!
//! Unified interface over the LLM backends a vocabulary card can be generated
//! with: hosted APIs (Google Gemini, OpenAI, Anthropic) through native adapters,
//! and Ollama, OpenRouter or any custom endpoint through an OpenAI-compatible
//! adapter. Resolution maps a [`ProviderConfig`] onto a concrete client without
//! touching the network.

use crate::error::ApiError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

pub mod anthropic;
pub mod google;
mod http;
pub mod openai;

pub use anthropic::AnthropicClient;
pub use google::GoogleClient;
pub use openai::{OpenAIClient, OpenAICompatibleClient};

/// Closed set of supported providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    Google,
    OpenAI,
    Anthropic,
    Ollama,
    OpenRouter,
    Custom,
}

/// Wire protocol spoken by the client built for a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterKind {
    Google,
    OpenAI,
    Anthropic,
    OpenAICompatible,
}

impl AdapterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterKind::Google => "google",
            AdapterKind::OpenAI => "openai",
            AdapterKind::Anthropic => "anthropic",
            AdapterKind::OpenAICompatible => "openai-compatible",
        }
    }
}

/// Per-provider defaults applied when the configuration leaves a field empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderDefaults {
    pub base_url: Option<&'static str>,
    pub model: Option<&'static str>,
    pub adapter: AdapterKind,
}

impl ProviderName {
    pub const ALL: [ProviderName; 6] = [
        ProviderName::Google,
        ProviderName::OpenAI,
        ProviderName::Anthropic,
        ProviderName::Ollama,
        ProviderName::OpenRouter,
        ProviderName::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderName::Google => "google",
            ProviderName::OpenAI => "openai",
            ProviderName::Anthropic => "anthropic",
            ProviderName::Ollama => "ollama",
            ProviderName::OpenRouter => "openrouter",
            ProviderName::Custom => "custom",
        }
    }

    /// Human-readable name used in settings headings.
    pub fn label(&self) -> &'static str {
        match self {
            ProviderName::Google => "Google Gemini",
            ProviderName::OpenAI => "OpenAI",
            ProviderName::Anthropic => "Anthropic",
            ProviderName::Ollama => "Ollama (Local)",
            ProviderName::OpenRouter => "OpenRouter",
            ProviderName::Custom => "Custom Provider",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        *self != ProviderName::Ollama
    }

    pub fn defaults(&self) -> ProviderDefaults {
        match self {
            ProviderName::Google => ProviderDefaults {
                base_url: Some(google::DEFAULT_BASE_URL),
                model: Some("gemini-2.5-flash"),
                adapter: AdapterKind::Google,
            },
            ProviderName::OpenAI => ProviderDefaults {
                base_url: Some(openai::DEFAULT_BASE_URL),
                model: Some("gpt-5-2"),
                adapter: AdapterKind::OpenAI,
            },
            ProviderName::Anthropic => ProviderDefaults {
                base_url: Some(anthropic::DEFAULT_BASE_URL),
                model: Some("claude-haiku-4-5"),
                adapter: AdapterKind::Anthropic,
            },
            ProviderName::Ollama => ProviderDefaults {
                base_url: Some("http://localhost:11434/v1"),
                model: Some("glm-4.7-flash"),
                adapter: AdapterKind::OpenAICompatible,
            },
            ProviderName::OpenRouter => ProviderDefaults {
                base_url: Some("https://openrouter.ai/api/v1"),
                model: Some("google/gemini-2.5-flash"),
                adapter: AdapterKind::OpenAICompatible,
            },
            ProviderName::Custom => ProviderDefaults {
                base_url: None,
                model: None,
                adapter: AdapterKind::OpenAICompatible,
            },
        }
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderName {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderName::ALL
            .into_iter()
            .find(|provider| provider.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ApiError::ConfigError(format!(
                    "Unknown provider: {}. \
                     Must be one of google, openai, anthropic, ollama, openrouter, custom",
                    s
                ))
            })
    }
}

/// Whether `provider` needs an API key. Only Ollama runs without one; callers
/// may still relax the check for `custom`.
pub fn requires_api_key(provider: ProviderName) -> bool {
    provider.requires_api_key()
}

/// Connection parameters for a single generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub provider: ProviderName,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model_name: Option<String>,
}

impl ProviderConfig {
    pub fn new(provider: ProviderName) -> Self {
        Self {
            provider,
            api_key: None,
            base_url: None,
            model_name: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }
}

/// JSON Schema the backend should constrain its output to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSchema {
    pub name: String,
    pub description: Option<String>,
    pub schema: Value,
}

/// Uniform request handed to every backend.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
    pub output_schema: Option<OutputSchema>,
}

impl GenerationRequest {
    pub fn text(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            output_schema: None,
        }
    }

    pub fn structured(
        system: impl Into<String>,
        prompt: impl Into<String>,
        schema: OutputSchema,
    ) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            output_schema: Some(schema),
        }
    }
}

/// What a backend produced: a parsed object in structured mode, free text
/// otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutput {
    Object(Value),
    Text(String),
}

/// Token usage information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResponse {
    pub output: GenerationOutput,
    pub model: String,
    pub usage: TokenUsage,
    pub finish_reason: Option<String>,
}

/// A generation backend bound to an endpoint, credentials and model.
#[async_trait]
pub trait ModelProviderClient: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, ApiError>;

    /// Get the provider name
    fn provider_name(&self) -> &str;

    /// Get the model name
    fn model_name(&self) -> &str;

    fn base_url(&self) -> &str;
}

/// Maps provider configuration onto a backend. Implemented by
/// [`ProviderFactory`]; tests and hosts substitute their own.
pub trait BackendResolver: Send + Sync {
    fn resolve(&self, config: &ProviderConfig) -> Result<Box<dyn ModelProviderClient>, ApiError>;
}

/// Fully-defaulted connection parameters for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProvider {
    pub provider: ProviderName,
    pub adapter: AdapterKind,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

/// Provider factory for creating provider clients
pub struct ProviderFactory;

impl ProviderFactory {
    /// Apply per-provider defaults and check required fields. Pure.
    pub fn plan(config: &ProviderConfig) -> Result<ResolvedProvider, ApiError> {
        let provider = config.provider;
        let defaults = provider.defaults();
        let api_key = non_empty(&config.api_key);
        let base_url = non_empty(&config.base_url);
        let model = non_empty(&config.model_name);

        if provider == ProviderName::Custom {
            if base_url.is_none() {
                return Err(ApiError::ConfigError(
                    "Base URL required for custom provider".to_string(),
                ));
            }
            if model.is_none() {
                return Err(ApiError::ConfigError(
                    "Model name required for custom provider".to_string(),
                ));
            }
        }

        if provider.requires_api_key() && provider != ProviderName::Custom && api_key.is_none() {
            return Err(ApiError::ConfigError(format!(
                "API key required for {} provider",
                provider
            )));
        }

        let base_url = base_url
            .or_else(|| defaults.base_url.map(str::to_string))
            .ok_or_else(|| {
                ApiError::ConfigError(format!("Base URL required for {} provider", provider))
            })?;
        let model = model
            .or_else(|| defaults.model.map(str::to_string))
            .ok_or_else(|| {
                ApiError::ConfigError(format!("Model name required for {} provider", provider))
            })?;

        Ok(ResolvedProvider {
            provider,
            adapter: defaults.adapter,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
        })
    }

    pub fn create_client(
        resolved: &ResolvedProvider,
    ) -> Result<Box<dyn ModelProviderClient>, ApiError> {
        debug!(
            provider = %resolved.provider,
            model = %resolved.model,
            base_url = %resolved.base_url,
            "Creating provider client"
        );

        let required_key = || {
            resolved.api_key.clone().ok_or_else(|| {
                ApiError::ConfigError(format!(
                    "API key required for {} provider",
                    resolved.provider
                ))
            })
        };

        match resolved.adapter {
            AdapterKind::Google => Ok(Box::new(GoogleClient::new(
                resolved.model.clone(),
                required_key()?,
                resolved.base_url.clone(),
            )?)),
            AdapterKind::OpenAI => Ok(Box::new(OpenAIClient::new(
                resolved.model.clone(),
                required_key()?,
                resolved.base_url.clone(),
            )?)),
            AdapterKind::Anthropic => Ok(Box::new(AnthropicClient::new(
                resolved.model.clone(),
                required_key()?,
                resolved.base_url.clone(),
            )?)),
            AdapterKind::OpenAICompatible => Ok(Box::new(OpenAICompatibleClient::new(
                resolved.provider.as_str(),
                resolved.model.clone(),
                resolved.base_url.clone(),
                resolved.api_key.clone(),
            )?)),
        }
    }

    /// Plan and build a client in one step.
    pub fn resolve(config: &ProviderConfig) -> Result<Box<dyn ModelProviderClient>, ApiError> {
        let resolved = Self::plan(config)?;
        Self::create_client(&resolved)
    }
}

impl BackendResolver for ProviderFactory {
    fn resolve(&self, config: &ProviderConfig) -> Result<Box<dyn ModelProviderClient>, ApiError> {
        let resolved = Self::plan(config)?;
        Self::create_client(&resolved)
    }
}

/// Build the backend for `config`. No network traffic happens here.
pub fn create_model(config: &ProviderConfig) -> Result<Box<dyn ModelProviderClient>, ApiError> {
    ProviderFactory::resolve(config)
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// Scripted provider for testing
#[cfg(test)]
pub struct MockProvider {
    responses: std::sync::Mutex<std::collections::VecDeque<Result<GenerationOutput, ApiError>>>,
    requests: std::sync::Mutex<Vec<GenerationRequest>>,
}

#[cfg(test)]
impl MockProvider {
    pub fn new(responses: Vec<Result<GenerationOutput, ApiError>>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses.into()),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl ModelProviderClient for MockProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, ApiError> {
        self.requests.lock().unwrap().push(request);
        let next = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::ProviderError("mock exhausted".to_string())));

        next.map(|output| GenerationResponse {
            output,
            model: "mock-model".to_string(),
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 20,
                total_tokens: 30,
            },
            finish_reason: Some("stop".to_string()),
        })
    }

    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }

    fn base_url(&self) -> &str {
        "mock://"
    }
}
