//! Vocabulary Card Generation
//!
//! Obtains a validated [`WordDefinition`] from a backend. The first attempt asks
//! for schema-constrained output. When the backend signals that it cannot do
//! structured output, a single free-text attempt follows in which the model is
//! told to reply with raw JSON, which is then fence-stripped, parsed and
//! validated. Nothing else is retried.

use crate::definition::{self, WordDefinition};
use crate::error::ApiError;
use crate::provider::{
    create_model, GenerationOutput, GenerationRequest, ModelProviderClient, ProviderConfig,
};
use serde_json::Value;
use tracing::{debug, info, warn};

pub const SYSTEM_PROMPT: &str = "You are a vocabulary dictionary assistant. \
Provide accurate word definitions with phonetic pronunciation, \
clear explanations, and helpful example sentences.";

const FALLBACK_SYSTEM_PROMPT: &str = "You are a vocabulary dictionary assistant. \
Provide accurate word definitions with phonetic pronunciation, \
clear explanations, and helpful example sentences. \
Respond with ONLY a raw JSON object, without markdown formatting or commentary.";

const FALLBACK_FIELDS: &str = r#"Respond with ONLY a JSON object containing these fields:
- "word": the vocabulary word (string)
- "pronunciation": IPA or phonetic spelling (string)
- "definition": a clear, concise meaning (string)
- "examples": exactly two example sentences (array of 2 strings)
- "image": optional URL to a relevant image (string, omit if unknown)"#;

pub fn definition_prompt(word: &str) -> String {
    format!("Define the word: \"{}\"", word)
}

/// Whether `error` means the backend cannot do schema-constrained generation.
///
/// Matches the "no object generated" category and the messages OpenAI-style
/// endpoints return when `response_format` / JSON mode is unavailable.
pub fn is_structured_output_incompatibility(error: &ApiError) -> bool {
    if matches!(error, ApiError::NoObjectGenerated(_)) {
        return true;
    }
    let message = error.to_string().to_lowercase();
    let not_supported = message.contains("not supported");
    (message.contains("response_format") && not_supported)
        || (message.contains("json_object") && not_supported)
        || message.contains("json mode cannot be combined with")
}

/// Remove a leading ```` ``` ```` / ```` ```json ```` fence and a trailing
/// ```` ``` ```` fence.
pub fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        body = match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        };
    }
    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

/// Parse free-form model output into a definition.
pub fn parse_definition_text(text: &str) -> Result<WordDefinition, ApiError> {
    let cleaned = strip_code_fences(text);
    let value: Value = serde_json::from_str(cleaned)
        .map_err(|e| ApiError::ParseError(format!("{} in response: {}", e, cleaned)))?;
    definition::validate(&value)
}

fn definition_from_output(output: GenerationOutput) -> Result<WordDefinition, ApiError> {
    match output {
        GenerationOutput::Object(value) => definition::validate(&value),
        GenerationOutput::Text(text) => parse_definition_text(&text),
    }
}

/// Generate a definition for `word` with `client`.
pub async fn generate_vocabulary_card(
    client: &dyn ModelProviderClient,
    word: &str,
) -> Result<WordDefinition, ApiError> {
    let request = GenerationRequest::structured(
        SYSTEM_PROMPT,
        definition_prompt(word),
        WordDefinition::output_schema(),
    );

    info!(
        word = %word,
        provider = client.provider_name(),
        model = client.model_name(),
        "Requesting structured definition"
    );

    match client.generate(request).await {
        Ok(response) => {
            debug!(
                prompt_tokens = response.usage.prompt_tokens,
                completion_tokens = response.usage.completion_tokens,
                "Structured generation completed"
            );
            definition_from_output(response.output)
        }
        Err(err) if is_structured_output_incompatibility(&err) => {
            warn!(
                provider = client.provider_name(),
                model = client.model_name(),
                error = %err,
                "Structured output unsupported, retrying with manual JSON parsing"
            );
            generate_with_manual_parsing(client, word).await
        }
        Err(err) => Err(err),
    }
}

async fn generate_with_manual_parsing(
    client: &dyn ModelProviderClient,
    word: &str,
) -> Result<WordDefinition, ApiError> {
    let request = GenerationRequest::text(
        FALLBACK_SYSTEM_PROMPT,
        format!("{}\n\n{}", definition_prompt(word), FALLBACK_FIELDS),
    );
    let response = client.generate(request).await?;
    debug!(
        completion_tokens = response.usage.completion_tokens,
        "Fallback generation completed"
    );
    definition_from_output(response.output)
}

/// Resolve a backend for `config` and generate a definition for `word`.
pub async fn generate_for_config(
    config: &ProviderConfig,
    word: &str,
) -> Result<WordDefinition, ApiError> {
    let client = create_model(config)?;
    generate_vocabulary_card(client.as_ref(), word).await
}
