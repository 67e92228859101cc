//! Host Settings
//!
//! The plugin persists its settings in the host's key/value store using a
//! flattened layout: `provider`, `apiKey`, `baseUrl`, `modelName` and
//! `customTags`. Each command invocation works on an immutable [`Settings`]
//! snapshot; reacting to edits goes through an explicit [`SettingsChange`].

use crate::error::ApiError;
use crate::provider::{ProviderConfig, ProviderName};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};

pub const DEFAULT_CUSTOM_TAGS: &str = "#words";

/// Snapshot of the plugin settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_provider")]
    pub provider: ProviderName,

    #[serde(
        default,
        alias = "api_key",
        alias = "apikey",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub api_key: Option<String>,

    #[serde(
        default,
        alias = "base_url",
        alias = "baseurl",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub base_url: Option<String>,

    #[serde(
        default,
        alias = "model_name",
        alias = "modelname",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub model_name: Option<String>,

    #[serde(default = "default_custom_tags", alias = "custom_tags", alias = "customtags")]
    pub custom_tags: String,
}

fn default_provider() -> ProviderName {
    ProviderName::Google
}

fn default_custom_tags() -> String {
    DEFAULT_CUSTOM_TAGS.to_string()
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: None,
            base_url: None,
            model_name: None,
            custom_tags: default_custom_tags(),
        }
    }
}

impl Settings {
    /// Read a snapshot from the host's key/value store.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, ApiError> {
        serde_json::from_value(Value::Object(map.clone()))
            .map_err(|e| ApiError::ConfigError(format!("Invalid plugin settings: {}", e)))
    }

    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            provider: self.provider,
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            model_name: self.model_name.clone(),
        }
    }

    /// Check the snapshot before any request is made. The error messages tell
    /// the user which setting to fix.
    pub fn check(&self) -> Result<(), ApiError> {
        let provider = self.provider;
        if provider.requires_api_key() && provider != ProviderName::Custom && self.api_key.is_none()
        {
            return Err(ApiError::ConfigError(format!(
                "Please configure {} API key in settings",
                provider
            )));
        }
        if provider == ProviderName::Custom {
            if self.base_url.is_none() {
                return Err(ApiError::ConfigError(
                    "Base URL is required for custom provider".to_string(),
                ));
            }
            if self.model_name.is_none() {
                return Err(ApiError::ConfigError(
                    "Model name is required for custom provider".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Input widget type of a setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingKind {
    String,
    Enum,
    Heading,
}

/// One entry of the settings form the host renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingDescriptor {
    pub key: String,
    #[serde(rename = "type")]
    pub kind: SettingKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enum_choices: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_picker: Option<String>,
    pub default: Value,
    pub title: String,
    pub description: String,
}

impl SettingDescriptor {
    fn string(key: &str, title: &str, description: String, default: &str) -> Self {
        Self {
            key: key.to_string(),
            kind: SettingKind::String,
            enum_choices: Vec::new(),
            enum_picker: None,
            default: json!(default),
            title: title.to_string(),
            description,
        }
    }

    fn heading(key: &str, title: &str) -> Self {
        Self {
            key: key.to_string(),
            kind: SettingKind::Heading,
            enum_choices: Vec::new(),
            enum_picker: None,
            default: Value::Null,
            title: title.to_string(),
            description: String::new(),
        }
    }
}

/// Settings form for `provider`.
///
/// Connection fields default to empty so that switching providers never
/// carries one provider's endpoint or model over to another; the effective
/// defaults are shown in the descriptions instead.
pub fn settings_schema(provider: ProviderName) -> Vec<SettingDescriptor> {
    let defaults = provider.defaults();

    let api_key_title = if provider.requires_api_key() && provider != ProviderName::Custom {
        "API Key"
    } else {
        "API Key (Optional)"
    };
    let api_key_description = match provider {
        ProviderName::Google => "Enter your Gemini API Key".to_string(),
        ProviderName::Ollama => "Not usually required for local Ollama".to_string(),
        ProviderName::Custom => "API Key if required by your provider".to_string(),
        other => format!("Enter your {} API Key", other.label()),
    };

    let base_url_title = match provider {
        ProviderName::Custom => "Base URL",
        _ => "Base URL (Optional)",
    };
    let base_url_description = match (provider, defaults.base_url) {
        (ProviderName::Custom, _) => "Full URL to OpenAI-compatible endpoint".to_string(),
        (ProviderName::Ollama, Some(url)) => {
            format!("Endpoint for local Ollama server. Default: {}", url)
        }
        (_, Some(url)) => format!("Override default {} API endpoint ({})", provider.label(), url),
        (_, None) => format!("Override default {} API endpoint", provider.label()),
    };

    let model_description = match (provider, defaults.model) {
        (ProviderName::Ollama, Some(model)) => {
            format!("Default: {} (must be pulled first)", model)
        }
        (_, Some(model)) => format!("Default: {}", model),
        (_, None) => "Model ID to request".to_string(),
    };

    vec![
        SettingDescriptor {
            key: "provider".to_string(),
            kind: SettingKind::Enum,
            enum_choices: ProviderName::ALL
                .iter()
                .map(|p| p.as_str().to_string())
                .collect(),
            enum_picker: Some("select".to_string()),
            default: json!(ProviderName::Google.as_str()),
            title: "AI Provider".to_string(),
            description: "Select which provider to use for generation. \
                          Configure the specific settings below."
                .to_string(),
        },
        SettingDescriptor::heading("connectionHeading", provider.label()),
        SettingDescriptor::string("apiKey", api_key_title, api_key_description, ""),
        SettingDescriptor::string("baseUrl", base_url_title, base_url_description, ""),
        SettingDescriptor::string("modelName", "Model Name", model_description, ""),
        SettingDescriptor::heading("generalHeading", "General"),
        SettingDescriptor::string(
            "customTags",
            "Custom Tags",
            "Tags to add to vocabulary cards".to_string(),
            DEFAULT_CUSTOM_TAGS,
        ),
    ]
}

/// A settings edit reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsChange {
    pub old: Option<Settings>,
    pub new: Settings,
}

impl SettingsChange {
    pub fn provider_changed(&self) -> bool {
        self.old.as_ref().map(|old| old.provider) != Some(self.new.provider)
    }

    /// The schema to install, if the edit switched providers.
    pub fn schema_update(&self) -> Option<Vec<SettingDescriptor>> {
        self.provider_changed()
            .then(|| settings_schema(self.new.provider))
    }
}
