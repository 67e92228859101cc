//! CLI presentation: text and json formatters per command.

use crate::error::ApiError;
use crate::provider::ProviderName;
use crate::settings::settings_schema;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use serde_json::json;

pub fn format_provider_table() -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "Provider",
        "Name",
        "Adapter",
        "Default Base URL",
        "Default Model",
        "API Key",
    ]);
    for provider in ProviderName::ALL {
        let defaults = provider.defaults();
        let key = if provider.requires_api_key() && provider != ProviderName::Custom {
            "required"
        } else {
            "optional"
        };
        table.add_row(vec![
            provider.as_str(),
            provider.label(),
            defaults.adapter.as_str(),
            defaults.base_url.unwrap_or("-"),
            defaults.model.unwrap_or("-"),
            key,
        ]);
    }
    table.to_string()
}

pub fn format_providers_json() -> Result<String, ApiError> {
    let providers: Vec<_> = ProviderName::ALL
        .iter()
        .map(|provider| {
            let defaults = provider.defaults();
            json!({
                "provider": provider.as_str(),
                "label": provider.label(),
                "adapter": defaults.adapter.as_str(),
                "base_url": defaults.base_url,
                "model": defaults.model,
                "requires_api_key": provider.requires_api_key(),
            })
        })
        .collect();
    serde_json::to_string_pretty(&json!({ "providers": providers, "total": providers.len() }))
        .map_err(|e| ApiError::ConfigError(format!("Failed to render providers: {}", e)))
}

pub fn format_schema_json(provider: ProviderName) -> Result<String, ApiError> {
    serde_json::to_string_pretty(&settings_schema(provider))
        .map_err(|e| ApiError::ConfigError(format!("Failed to render settings schema: {}", e)))
}
