//! Integration tests for the "Generate Vocabulary Card" command flow

use super::test_utils::{
    ephemeral_json, HostEvent, RecordingHost, ScriptedBackend, ScriptedResolver,
};
use lexicard::command::{CommandOutcome, Plugin, VocabularyCardCommand};
use lexicard::error::ApiError;
use lexicard::host::{Placement, Severity};
use lexicard::provider::{GenerationOutput, ProviderFactory, ProviderName};
use lexicard::settings::{Settings, SettingsChange};
use serde_json::json;

fn openai_settings() -> serde_json::Value {
    json!({ "provider": "openai", "apiKey": "sk-test" })
}

#[tokio::test]
async fn test_generates_card_into_host() {
    let backend = ScriptedBackend::new(vec![Ok(GenerationOutput::Object(ephemeral_json()))]);
    let resolver = ScriptedResolver::new(backend.clone());
    let host = RecordingHost::new(Some("  ephemeral "), openai_settings());

    let outcome = VocabularyCardCommand::new(&resolver).run(&host).await.unwrap();

    let expected = vec![
        "ephemeral #card #words".to_string(),
        "*/ɪˈfem(ə)rəl/*".to_string(),
        "**lasting for a very short time**".to_string(),
        "Fame is ephemeral.".to_string(),
        "An ephemeral stream.".to_string(),
    ];
    match outcome {
        CommandOutcome::Generated { lines, .. } => assert_eq!(lines, expected),
        other => panic!("unexpected outcome: {:?}", other),
    }

    assert_eq!(host.writes(), expected);
    assert_eq!(backend.calls(), 1);
    assert!(backend.requests()[0].prompt.contains("\"ephemeral\""));

    let resolved = resolver.resolved();
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].provider, ProviderName::OpenAI);
    assert_eq!(resolved[0].api_key.as_deref(), Some("sk-test"));
}

#[tokio::test]
async fn test_first_line_replaces_block_and_rest_are_children() {
    let backend = ScriptedBackend::new(vec![Ok(GenerationOutput::Object(ephemeral_json()))]);
    let resolver = ScriptedResolver::new(backend);
    let host = RecordingHost::new(
        Some("ephemeral"),
        json!({ "provider": "ollama", "customTags": "#vocab #en" }),
    );

    VocabularyCardCommand::new(&resolver).run(&host).await.unwrap();

    let events = host.events();
    assert_eq!(
        events[0],
        HostEvent::Message(Severity::Info, "Generating card for \"ephemeral\"...".to_string())
    );
    assert_eq!(events[1], HostEvent::Update("ephemeral #card #vocab #en".to_string()));
    for event in &events[2..6] {
        assert!(matches!(event, HostEvent::Insert(_, Placement::Child)));
    }
    assert_eq!(
        events[6],
        HostEvent::Message(Severity::Success, "Vocabulary card generated!".to_string())
    );
    assert_eq!(events.len(), 7);
}

#[tokio::test]
async fn test_blank_block_warns_without_generating() {
    let backend = ScriptedBackend::new(vec![]);
    let resolver = ScriptedResolver::new(backend.clone());

    for content in [None, Some(""), Some("   ")] {
        let host = RecordingHost::new(content, openai_settings());
        let outcome = VocabularyCardCommand::new(&resolver).run(&host).await.unwrap();
        assert_eq!(outcome, CommandOutcome::NoWord);
        assert_eq!(
            host.events(),
            vec![HostEvent::Message(
                Severity::Warning,
                "No word found in current block".to_string()
            )]
        );
    }
    assert_eq!(backend.calls(), 0);
    assert!(resolver.resolved().is_empty());
}

#[tokio::test]
async fn test_missing_api_key_is_reported_once() {
    let backend = ScriptedBackend::new(vec![]);
    let resolver = ScriptedResolver::new(backend.clone());
    let host = RecordingHost::new(Some("ephemeral"), json!({ "provider": "anthropic" }));

    let err = VocabularyCardCommand::new(&resolver)
        .run(&host)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::ConfigError(_)));
    assert_eq!(
        host.messages(),
        vec![(
            Severity::Error,
            "Please configure anthropic API key in settings".to_string()
        )]
    );
    assert!(host.writes().is_empty());
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_custom_provider_requirements() {
    let resolver = ScriptedResolver::new(ScriptedBackend::new(vec![]));

    let host = RecordingHost::new(Some("ephemeral"), json!({ "provider": "custom" }));
    assert!(VocabularyCardCommand::new(&resolver).run(&host).await.is_err());
    assert_eq!(
        host.messages(),
        vec![(
            Severity::Error,
            "Base URL is required for custom provider".to_string()
        )]
    );

    let host = RecordingHost::new(
        Some("ephemeral"),
        json!({ "provider": "custom", "baseUrl": "http://localhost:8080/v1" }),
    );
    assert!(VocabularyCardCommand::new(&resolver).run(&host).await.is_err());
    assert_eq!(
        host.messages(),
        vec![(
            Severity::Error,
            "Model name is required for custom provider".to_string()
        )]
    );
}

#[tokio::test]
async fn test_backend_failure_leaves_document_untouched() {
    let backend = ScriptedBackend::new(vec![Err(ApiError::ProviderAuthFailed(
        "invalid key".to_string(),
    ))]);
    let resolver = ScriptedResolver::new(backend.clone());
    let host = RecordingHost::new(Some("ephemeral"), openai_settings());

    let err = VocabularyCardCommand::new(&resolver)
        .run(&host)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::ProviderAuthFailed(_)));
    assert_eq!(backend.calls(), 1);
    assert!(host.writes().is_empty());

    let errors: Vec<_> = host
        .messages()
        .into_iter()
        .filter(|(severity, _)| *severity == Severity::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].1,
        "Error: Provider authentication failed: invalid key"
    );
}

#[tokio::test]
async fn test_invalid_definition_reported_once() {
    let mut bad = ephemeral_json();
    bad["examples"] = json!(["only one"]);
    let backend = ScriptedBackend::new(vec![Ok(GenerationOutput::Object(bad))]);
    let resolver = ScriptedResolver::new(backend.clone());
    let host = RecordingHost::new(Some("ephemeral"), openai_settings());

    let err = VocabularyCardCommand::new(&resolver)
        .run(&host)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::ValidationError(_)));
    assert_eq!(backend.calls(), 1);
    assert!(host.writes().is_empty());
    let last = host.messages().pop().unwrap();
    assert_eq!(last.0, Severity::Error);
    assert!(last.1.starts_with("Error: Invalid definition:"));
}

#[tokio::test]
async fn test_default_resolver_rejects_bad_provider_settings() {
    let host = RecordingHost::new(Some("ephemeral"), json!({ "provider": "bing" }));
    let err = VocabularyCardCommand::new(&ProviderFactory)
        .run(&host)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::ConfigError(_)));
    assert_eq!(host.messages().len(), 1);
}

#[tokio::test]
async fn test_plugin_ready_installs_schema() {
    let host = RecordingHost::new(None, json!({ "provider": "ollama" }));
    let settings = Plugin::ready(&host).await.unwrap();
    assert_eq!(settings.provider, ProviderName::Ollama);

    match &host.events()[..] {
        [HostEvent::Schema(keys)] => {
            assert_eq!(keys[0], "provider");
            assert!(keys.contains(&"apiKey".to_string()));
        }
        other => panic!("unexpected events: {:?}", other),
    }
}

#[tokio::test]
async fn test_plugin_ready_falls_back_to_defaults_on_invalid_settings() {
    let host = RecordingHost::new(None, json!({ "provider": "bing" }));
    let settings = Plugin::ready(&host).await.unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.provider, ProviderName::Google);

    match &host.events()[..] {
        [HostEvent::Schema(keys)] => assert_eq!(keys[0], "provider"),
        other => panic!("unexpected events: {:?}", other),
    }
}

#[tokio::test]
async fn test_settings_change_swaps_schema_only_on_provider_change() {
    let host = RecordingHost::new(None, json!({}));
    let google = Settings::default();
    let openai = Settings {
        provider: ProviderName::OpenAI,
        ..Settings::default()
    };

    let unchanged = SettingsChange {
        old: Some(google.clone()),
        new: Settings {
            custom_tags: "#vocab".to_string(),
            ..google.clone()
        },
    };
    assert!(!Plugin::settings_changed(&host, &unchanged).await.unwrap());
    assert!(host.events().is_empty());

    let switched = SettingsChange {
        old: Some(google),
        new: openai,
    };
    assert!(Plugin::settings_changed(&host, &switched).await.unwrap());
    assert_eq!(host.events().len(), 1);
}
