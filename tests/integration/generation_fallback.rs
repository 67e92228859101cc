//! Integration tests for structured generation and the text fallback

use super::test_utils::{ephemeral_json, ScriptedBackend};
use lexicard::error::ApiError;
use lexicard::generation::{generate_vocabulary_card, SYSTEM_PROMPT};
use lexicard::provider::GenerationOutput;

#[tokio::test]
async fn test_structured_success_makes_one_call() {
    let backend = ScriptedBackend::new(vec![Ok(GenerationOutput::Object(ephemeral_json()))]);

    let definition = generate_vocabulary_card(backend.as_ref(), "ephemeral")
        .await
        .unwrap();

    assert_eq!(definition.word(), "ephemeral");
    assert_eq!(backend.calls(), 1);

    let request = &backend.requests()[0];
    assert_eq!(request.system, SYSTEM_PROMPT);
    assert_eq!(request.prompt, "Define the word: \"ephemeral\"");
    let schema = request.output_schema.as_ref().unwrap();
    assert_eq!(schema.schema["properties"]["examples"]["minItems"], 2);
}

#[tokio::test]
async fn test_no_object_generated_falls_back_to_fenced_text() {
    let fenced = format!("```json\n{}\n```", ephemeral_json());
    let backend = ScriptedBackend::new(vec![
        Err(ApiError::NoObjectGenerated("empty response".to_string())),
        Ok(GenerationOutput::Text(fenced)),
    ]);

    let definition = generate_vocabulary_card(backend.as_ref(), "ephemeral")
        .await
        .unwrap();

    assert_eq!(definition.definition(), "lasting for a very short time");
    assert_eq!(backend.calls(), 2);

    let requests = backend.requests();
    assert!(requests[0].output_schema.is_some());
    assert!(requests[1].output_schema.is_none());
    assert!(requests[1].prompt.contains("\"examples\""));
}

#[tokio::test]
async fn test_response_format_rejection_falls_back() {
    let backend = ScriptedBackend::new(vec![
        Err(ApiError::ProviderRequestFailed(
            "Request failed with status 400: \
             response_format json_schema is not supported by this model"
                .to_string(),
        )),
        Ok(GenerationOutput::Text(ephemeral_json().to_string())),
    ]);

    assert!(generate_vocabulary_card(backend.as_ref(), "ephemeral")
        .await
        .is_ok());
    assert_eq!(backend.calls(), 2);
}

#[tokio::test]
async fn test_fallback_failure_is_not_retried_again() {
    let backend = ScriptedBackend::new(vec![
        Err(ApiError::NoObjectGenerated("empty".to_string())),
        Ok(GenerationOutput::Text("I cannot help with that.".to_string())),
    ]);

    let err = generate_vocabulary_card(backend.as_ref(), "ephemeral")
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::ParseError(_)));
    assert_eq!(backend.calls(), 2);
}

#[tokio::test]
async fn test_fallback_output_is_validated() {
    let mut three_examples = ephemeral_json();
    three_examples["examples"] = serde_json::json!(["a", "b", "c"]);
    let backend = ScriptedBackend::new(vec![
        Err(ApiError::NoObjectGenerated("empty".to_string())),
        Ok(GenerationOutput::Text(three_examples.to_string())),
    ]);

    let err = generate_vocabulary_card(backend.as_ref(), "ephemeral")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::ValidationError(_)));
}

#[tokio::test]
async fn test_other_backend_errors_propagate_without_fallback() {
    let cases = vec![
        ApiError::ProviderAuthFailed("bad key".to_string()),
        ApiError::ProviderRateLimit("slow down".to_string()),
        ApiError::ProviderRequestFailed("Connection error: refused".to_string()),
    ];

    for case in cases {
        let expected = case.to_string();
        let backend = ScriptedBackend::new(vec![Err(case)]);
        let err = generate_vocabulary_card(backend.as_ref(), "ephemeral")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), expected);
        assert_eq!(backend.calls(), 1);
    }
}
