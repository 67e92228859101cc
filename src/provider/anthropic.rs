//! Anthropic Messages API adapter.
//!
//! Structured output is obtained by forcing a single tool call whose input
//! schema is the requested output schema; the tool input is the object.

use super::http::{build_provider_http_client, check_status, map_http_error};
use super::{
    GenerationOutput, GenerationRequest, GenerationResponse, ModelProviderClient, TokenUsage,
};
use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;
const JSON_TOOL_NAME: &str = "json";

#[derive(Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    model: String,
    stop_reason: Option<String>,
    usage: Option<AnthropicUsage>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    ToolUse { name: String, input: Value },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

/// Anthropic provider client
pub struct AnthropicClient {
    client: Client,
    model: String,
    api_key: String,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(model: String, api_key: String, base_url: String) -> Result<Self, ApiError> {
        let client = build_provider_http_client()?;
        Ok(Self {
            client,
            model,
            api_key,
            base_url,
        })
    }

    fn request_body(&self, request: &GenerationRequest) -> Value {
        let mut request_body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "system": request.system,
            "messages": [{ "role": "user", "content": request.prompt }],
        });

        if let Some(schema) = &request.output_schema {
            request_body["tools"] = json!([{
                "name": JSON_TOOL_NAME,
                "description": schema
                    .description
                    .clone()
                    .unwrap_or_else(|| "Respond with a JSON object.".to_string()),
                "input_schema": schema.schema,
            }]);
            request_body["tool_choice"] = json!({ "type": "tool", "name": JSON_TOOL_NAME });
        }

        request_body
    }
}

fn extract_output(
    content: Vec<ContentBlock>,
    structured: bool,
) -> Result<GenerationOutput, ApiError> {
    if structured {
        return content
            .into_iter()
            .find_map(|block| match block {
                ContentBlock::ToolUse { name, input } if name == JSON_TOOL_NAME => Some(input),
                _ => None,
            })
            .filter(Value::is_object)
            .map(GenerationOutput::Object)
            .ok_or_else(|| {
                ApiError::NoObjectGenerated("response did not contain a json tool call".to_string())
            });
    }

    let text = content
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("");
    Ok(GenerationOutput::Text(text))
}

#[async_trait]
impl ModelProviderClient for AnthropicClient {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, ApiError> {
        let url = format!("{}/messages", self.base_url);
        let request_body = self.request_body(&request);
        debug!(url = %url, model = %self.model, "Sending Anthropic messages request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(map_http_error)?;
        let response = check_status(response).await?;

        let completion: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| ApiError::ProviderError(format!("Failed to parse response: {}", e)))?;

        let usage = completion.usage.unwrap_or(AnthropicUsage {
            input_tokens: 0,
            output_tokens: 0,
        });

        Ok(GenerationResponse {
            output: extract_output(completion.content, request.output_schema.is_some())?,
            model: completion.model,
            usage: TokenUsage {
                prompt_tokens: usage.input_tokens,
                completion_tokens: usage.output_tokens,
                total_tokens: usage.input_tokens + usage.output_tokens,
            },
            finish_reason: completion.stop_reason,
        })
    }

    fn provider_name(&self) -> &str {
        "anthropic"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
