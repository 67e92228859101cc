//! Google Gemini `generateContent` adapter.

use super::http::{
    build_provider_http_client, check_status, map_http_error, parse_structured_text,
};
use super::{
    GenerationOutput, GenerationRequest, GenerationResponse, ModelProviderClient, TokenUsage,
};
use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

/// Google Gemini provider client
pub struct GoogleClient {
    client: Client,
    model: String,
    api_key: String,
    base_url: String,
}

impl GoogleClient {
    pub fn new(model: String, api_key: String, base_url: String) -> Result<Self, ApiError> {
        let client = build_provider_http_client()?;
        Ok(Self {
            client,
            model,
            api_key,
            base_url,
        })
    }

    fn request_body(request: &GenerationRequest) -> Value {
        let mut body = json!({
            "systemInstruction": { "parts": [{ "text": request.system }] },
            "contents": [{ "role": "user", "parts": [{ "text": request.prompt }] }],
        });
        if let Some(schema) = &request.output_schema {
            body["generationConfig"] = json!({
                "responseMimeType": "application/json",
                "responseSchema": gemini_schema(&schema.schema),
            });
        }
        body
    }
}

/// Gemini accepts an OpenAPI subset of JSON Schema. Drop the keywords it
/// rejects; `format` survives only for the values it understands.
fn gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => {
            let cleaned: Map<String, Value> = map
                .iter()
                .filter(|(key, value)| match key.as_str() {
                    "$schema" | "additionalProperties" => false,
                    "format" => matches!(value.as_str(), Some("date-time") | Some("enum")),
                    _ => true,
                })
                .map(|(key, value)| {
                    let value = match (key.as_str(), value) {
                        ("properties", Value::Object(fields)) => gemini_properties(fields),
                        _ => gemini_schema(value),
                    };
                    (key.clone(), value)
                })
                .collect();
            Value::Object(cleaned)
        }
        Value::Array(items) => Value::Array(items.iter().map(gemini_schema).collect()),
        other => other.clone(),
    }
}

/// Property names are data, not keywords; only their schemas are cleaned.
fn gemini_properties(fields: &Map<String, Value>) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(name, schema)| (name.clone(), gemini_schema(schema)))
            .collect(),
    )
}

#[async_trait]
impl ModelProviderClient for GoogleClient {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, ApiError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = Self::request_body(&request);
        debug!(url = %url, model = %self.model, "Sending Gemini generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_http_error)?;
        let response = check_status(response).await?;

        let completion: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ApiError::ProviderError(format!("Failed to parse response: {}", e)))?;

        let candidate = completion.candidates.into_iter().next();
        let finish_reason = candidate.as_ref().and_then(|c| c.finish_reason.clone());
        let text = candidate
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let output = if request.output_schema.is_some() {
            GenerationOutput::Object(parse_structured_text(&text)?)
        } else {
            GenerationOutput::Text(text)
        };

        let usage = completion
            .usage_metadata
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            })
            .unwrap_or_default();

        Ok(GenerationResponse {
            output,
            model: completion.model_version.unwrap_or_else(|| self.model.clone()),
            usage,
            finish_reason,
        })
    }

    fn provider_name(&self) -> &str {
        "google"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
