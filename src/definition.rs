//! Word Definitions
//!
//! The canonical shape of a generated dictionary entry and the validator that
//! turns arbitrary JSON into a [`WordDefinition`]. The same shape is exported
//! as a JSON Schema so backends can constrain their output to it.

use crate::error::ApiError;
use crate::provider::OutputSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

/// Number of example sentences every definition carries.
pub const EXAMPLE_COUNT: usize = 2;

/// A validated dictionary entry for a single word.
///
/// Instances only come out of [`validate`] or [`WordDefinition::new`], so the
/// headword is never blank, there are exactly two examples and `image` (when
/// present) is a well-formed URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CandidateDefinition")]
pub struct WordDefinition {
    word: String,
    pronunciation: String,
    definition: String,
    examples: [String; EXAMPLE_COUNT],
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
}

/// Unchecked wire form. `image: null` is accepted as absent because strict
/// structured-output modes emit explicit nulls for optional fields.
#[derive(Deserialize)]
struct CandidateDefinition {
    word: String,
    pronunciation: String,
    definition: String,
    examples: Vec<String>,
    #[serde(default)]
    image: Option<String>,
}

impl TryFrom<CandidateDefinition> for WordDefinition {
    type Error = String;

    fn try_from(candidate: CandidateDefinition) -> Result<Self, Self::Error> {
        if candidate.word.trim().is_empty() {
            return Err("word must not be empty".to_string());
        }

        let found = candidate.examples.len();
        let examples: [String; EXAMPLE_COUNT] = candidate.examples.try_into().map_err(|_| {
            format!(
                "examples must contain exactly {} entries, got {}",
                EXAMPLE_COUNT, found
            )
        })?;

        if let Some(image) = &candidate.image {
            Url::parse(image).map_err(|e| format!("image is not a valid URL ({}): {}", e, image))?;
        }

        Ok(Self {
            word: candidate.word,
            pronunciation: candidate.pronunciation,
            definition: candidate.definition,
            examples,
            image: candidate.image,
        })
    }
}

impl WordDefinition {
    pub fn new(
        word: impl Into<String>,
        pronunciation: impl Into<String>,
        definition: impl Into<String>,
        examples: [String; EXAMPLE_COUNT],
        image: Option<String>,
    ) -> Result<Self, ApiError> {
        CandidateDefinition {
            word: word.into(),
            pronunciation: pronunciation.into(),
            definition: definition.into(),
            examples: examples.into(),
            image,
        }
        .try_into()
        .map_err(ApiError::ValidationError)
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn pronunciation(&self) -> &str {
        &self.pronunciation
    }

    pub fn definition(&self) -> &str {
        &self.definition
    }

    pub fn examples(&self) -> &[String; EXAMPLE_COUNT] {
        &self.examples
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// JSON Schema describing the definition shape, for schema-constrained
    /// generation.
    pub fn output_schema() -> OutputSchema {
        OutputSchema {
            name: "word_definition".to_string(),
            description: Some("A dictionary entry for a vocabulary word".to_string()),
            schema: json!({
                "$schema": "http://json-schema.org/draft-07/schema#",
                "type": "object",
                "properties": {
                    "word": {
                        "type": "string",
                        "description": "The vocabulary word"
                    },
                    "pronunciation": {
                        "type": "string",
                        "description": "IPA or phonetic spelling"
                    },
                    "definition": {
                        "type": "string",
                        "description": "Clear, concise meaning"
                    },
                    "examples": {
                        "type": "array",
                        "items": { "type": "string" },
                        "minItems": EXAMPLE_COUNT,
                        "maxItems": EXAMPLE_COUNT,
                        "description": "Two example sentences"
                    },
                    "image": {
                        "type": "string",
                        "format": "uri",
                        "description": "URL to a relevant image"
                    }
                },
                "required": ["word", "pronunciation", "definition", "examples"],
                "additionalProperties": false
            }),
        }
    }
}

/// Validate an arbitrary JSON value against the definition shape.
///
/// Fails with [`ApiError::ValidationError`] when the value is not an object,
/// a required field is missing or has the wrong type, `examples` does not hold
/// exactly two strings, or `image` is not a URL.
pub fn validate(candidate: &Value) -> Result<WordDefinition, ApiError> {
    if !candidate.is_object() {
        return Err(ApiError::ValidationError(format!(
            "expected a JSON object, got {}",
            json_type_name(candidate)
        )));
    }

    WordDefinition::deserialize(candidate).map_err(|e| ApiError::ValidationError(e.to_string()))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
