//! Host Collaborator
//!
//! The note-taking application the plugin runs inside. The command only needs
//! a handful of capabilities from it: read the current block, read the
//! settings store, edit and insert blocks, show notifications, and install
//! the settings form.

use crate::error::ApiError;
use crate::settings::SettingDescriptor;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

mod terminal;

pub use terminal::TerminalHost;

/// Opaque identifier of a block in the host document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub String);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A unit of text in the host document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: BlockId,
    pub content: String,
}

/// Where an inserted block goes relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Sibling,
    Child,
}

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Success,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Success => "success",
        }
    }
}

#[async_trait]
pub trait Host: Send + Sync {
    /// The block the cursor is in, if any.
    async fn current_block(&self) -> Result<Option<Block>, ApiError>;

    /// Current contents of the settings store.
    async fn settings(&self) -> Result<Map<String, Value>, ApiError>;

    async fn update_block(&self, id: &BlockId, content: &str) -> Result<(), ApiError>;

    /// Insert `content` next to `anchor`. Calls are applied in order.
    async fn insert_block(
        &self,
        anchor: &BlockId,
        content: &str,
        placement: Placement,
    ) -> Result<BlockId, ApiError>;

    async fn show_message(&self, message: &str, severity: Severity) -> Result<(), ApiError>;

    async fn use_settings_schema(&self, schema: &[SettingDescriptor]) -> Result<(), ApiError>;
}
