//! Chat-completions adapters: native OpenAI and OpenAI-compatible endpoints
//! (Ollama, OpenRouter, custom servers).
//!
//! Both speak the same request/response shape. They differ in how structured
//! output is requested: OpenAI gets a `json_schema` response format, while
//! compatible endpoints get JSON mode (`json_object`) with the schema spelled
//! out in the system message.

use super::http::{build_provider_http_client, check_status, map_http_error, parse_structured_text};
use super::{
    GenerationOutput, GenerationRequest, GenerationResponse, ModelProviderClient, OutputSchema,
    TokenUsage,
};
use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
    stream: bool,
}

#[derive(Serialize)]
struct OpenAIMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Deserialize, Default)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

struct Completion {
    content: String,
    model: String,
    usage: TokenUsage,
    finish_reason: Option<String>,
}

/// The HTTP half shared by both adapters.
struct ChatCompletions {
    client: Client,
    model: String,
    base_url: String,
    api_key: Option<String>,
}

impl ChatCompletions {
    fn new(model: String, base_url: String, api_key: Option<String>) -> Result<Self, ApiError> {
        Ok(Self {
            client: build_provider_http_client()?,
            model,
            base_url,
            api_key,
        })
    }

    async fn complete(
        &self,
        system: String,
        prompt: String,
        response_format: Option<Value>,
    ) -> Result<Completion, ApiError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                OpenAIMessage {
                    role: "system",
                    content: system,
                },
                OpenAIMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            response_format,
            stream: false,
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!(url = %url, model = %self.model, "Sending chat completion request");

        let mut request_builder = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");
        if let Some(api_key) = &self.api_key {
            request_builder =
                request_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = request_builder
            .json(&request)
            .send()
            .await
            .map_err(map_http_error)?;
        let response = check_status(response).await?;

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ApiError::ProviderError(format!("Failed to parse response: {}", e)))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::ProviderError("No choices in response".to_string()))?;

        if let Some(refusal) = choice.message.refusal {
            return Err(ApiError::ProviderError(format!("Model refused: {}", refusal)));
        }

        let usage = completion.usage.unwrap_or_default();
        Ok(Completion {
            content: choice.message.content.unwrap_or_default(),
            model: completion.model.unwrap_or_else(|| self.model.clone()),
            usage: TokenUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            },
            finish_reason: choice.finish_reason,
        })
    }
}

fn into_response(completion: Completion, structured: bool) -> Result<GenerationResponse, ApiError> {
    let output = if structured {
        GenerationOutput::Object(parse_structured_text(&completion.content)?)
    } else {
        GenerationOutput::Text(completion.content)
    };
    Ok(GenerationResponse {
        output,
        model: completion.model,
        usage: completion.usage,
        finish_reason: completion.finish_reason,
    })
}

/// OpenAI provider client
pub struct OpenAIClient {
    inner: ChatCompletions,
}

impl OpenAIClient {
    pub fn new(model: String, api_key: String, base_url: String) -> Result<Self, ApiError> {
        Ok(Self {
            inner: ChatCompletions::new(model, base_url, Some(api_key))?,
        })
    }
}

fn json_schema_format(schema: &OutputSchema) -> Value {
    let mut json_schema = json!({
        "name": schema.name,
        "schema": schema.schema,
        "strict": false,
    });
    if let Some(description) = &schema.description {
        json_schema["description"] = json!(description);
    }
    json!({ "type": "json_schema", "json_schema": json_schema })
}

#[async_trait]
impl ModelProviderClient for OpenAIClient {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, ApiError> {
        let response_format = request.output_schema.as_ref().map(json_schema_format);
        let structured = response_format.is_some();
        let completion = self
            .inner
            .complete(request.system, request.prompt, response_format)
            .await?;
        into_response(completion, structured)
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.inner.model
    }

    fn base_url(&self) -> &str {
        &self.inner.base_url
    }
}

/// Client for any endpoint implementing the OpenAI chat-completions API.
pub struct OpenAICompatibleClient {
    provider_name: String,
    inner: ChatCompletions,
}

impl OpenAICompatibleClient {
    pub fn new(
        provider_name: impl Into<String>,
        model: String,
        base_url: String,
        api_key: Option<String>,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            provider_name: provider_name.into(),
            inner: ChatCompletions::new(model, base_url, api_key)?,
        })
    }
}

/// System message for JSON mode: the endpoint only guarantees *some* JSON
/// object, so the schema has to travel in the prompt.
fn json_mode_system(system: &str, schema: &OutputSchema) -> String {
    format!(
        "{}\n\nJSON schema:\n{}\n\
         You MUST answer with a JSON object that matches the JSON schema above.",
        system, schema.schema
    )
}

#[async_trait]
impl ModelProviderClient for OpenAICompatibleClient {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, ApiError> {
        let (system, response_format) = match &request.output_schema {
            Some(schema) => (
                json_mode_system(&request.system, schema),
                Some(json!({ "type": "json_object" })),
            ),
            None => (request.system, None),
        };
        let structured = response_format.is_some();
        let completion = self
            .inner
            .complete(system, request.prompt, response_format)
            .await?;
        into_response(completion, structured)
    }

    fn provider_name(&self) -> &str {
        &self.provider_name
    }

    fn model_name(&self) -> &str {
        &self.inner.model
    }

    fn base_url(&self) -> &str {
        &self.inner.base_url
    }
}
