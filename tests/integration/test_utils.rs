//! Shared test utilities for integration tests
//!
//! Scripted backends, a resolver that hands them out, and a host that records
//! every call the command makes in order.

use async_trait::async_trait;
use lexicard::error::ApiError;
use lexicard::host::{Block, BlockId, Host, Placement, Severity};
use lexicard::provider::{
    BackendResolver, GenerationOutput, GenerationRequest, GenerationResponse, ModelProviderClient,
    ProviderConfig, TokenUsage,
};
use lexicard::settings::SettingDescriptor;
use serde_json::{json, Map, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A well-formed definition for "ephemeral".
pub fn ephemeral_json() -> Value {
    json!({
        "word": "ephemeral",
        "pronunciation": "/ɪˈfem(ə)rəl/",
        "definition": "lasting for a very short time",
        "examples": ["Fame is ephemeral.", "An ephemeral stream."]
    })
}

/// Backend that replays a fixed list of outcomes and records each request.
pub struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<GenerationOutput, ApiError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedBackend {
    pub fn new(responses: Vec<Result<GenerationOutput, ApiError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelProviderClient for ScriptedBackend {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, ApiError> {
        self.requests.lock().unwrap().push(request);
        let next = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::ProviderError("script exhausted".to_string())));
        next.map(|output| GenerationResponse {
            output,
            model: "scripted".to_string(),
            usage: TokenUsage::default(),
            finish_reason: Some("stop".to_string()),
        })
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted"
    }

    fn base_url(&self) -> &str {
        "http://scripted.invalid"
    }
}

struct SharedBackend(Arc<ScriptedBackend>);

#[async_trait]
impl ModelProviderClient for SharedBackend {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, ApiError> {
        self.0.generate(request).await
    }

    fn provider_name(&self) -> &str {
        self.0.provider_name()
    }

    fn model_name(&self) -> &str {
        self.0.model_name()
    }

    fn base_url(&self) -> &str {
        self.0.base_url()
    }
}

/// Resolver that always returns the same scripted backend.
pub struct ScriptedResolver {
    backend: Arc<ScriptedBackend>,
    resolved: Mutex<Vec<ProviderConfig>>,
}

impl ScriptedResolver {
    pub fn new(backend: Arc<ScriptedBackend>) -> Self {
        Self {
            backend,
            resolved: Mutex::new(Vec::new()),
        }
    }

    pub fn resolved(&self) -> Vec<ProviderConfig> {
        self.resolved.lock().unwrap().clone()
    }
}

impl BackendResolver for ScriptedResolver {
    fn resolve(&self, config: &ProviderConfig) -> Result<Box<dyn ModelProviderClient>, ApiError> {
        self.resolved.lock().unwrap().push(config.clone());
        Ok(Box::new(SharedBackend(Arc::clone(&self.backend))))
    }
}

/// One observable host interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Update(String),
    Insert(String, Placement),
    Message(Severity, String),
    Schema(Vec<String>),
}

/// Host double recording calls in order.
pub struct RecordingHost {
    block: Option<Block>,
    settings: Map<String, Value>,
    events: Mutex<Vec<HostEvent>>,
}

impl RecordingHost {
    pub fn new(content: Option<&str>, settings: Value) -> Self {
        let settings = match settings {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            block: content.map(|content| Block {
                id: BlockId("block-1".to_string()),
                content: content.to_string(),
            }),
            settings,
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<(Severity, String)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HostEvent::Message(severity, text) => Some((severity, text)),
                _ => None,
            })
            .collect()
    }

    /// Block writes only, in order.
    pub fn writes(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HostEvent::Update(text) | HostEvent::Insert(text, _) => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: HostEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl Host for RecordingHost {
    async fn current_block(&self) -> Result<Option<Block>, ApiError> {
        Ok(self.block.clone())
    }

    async fn settings(&self) -> Result<Map<String, Value>, ApiError> {
        Ok(self.settings.clone())
    }

    async fn update_block(&self, _id: &BlockId, content: &str) -> Result<(), ApiError> {
        self.record(HostEvent::Update(content.to_string()));
        Ok(())
    }

    async fn insert_block(
        &self,
        anchor: &BlockId,
        content: &str,
        placement: Placement,
    ) -> Result<BlockId, ApiError> {
        self.record(HostEvent::Insert(content.to_string(), placement));
        Ok(BlockId(format!("{}-child", anchor)))
    }

    async fn show_message(&self, message: &str, severity: Severity) -> Result<(), ApiError> {
        self.record(HostEvent::Message(severity, message.to_string()));
        Ok(())
    }

    async fn use_settings_schema(&self, schema: &[SettingDescriptor]) -> Result<(), ApiError> {
        self.record(HostEvent::Schema(
            schema.iter().map(|d| d.key.clone()).collect(),
        ));
        Ok(())
    }
}
