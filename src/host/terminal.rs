//! Terminal stand-in for the note-taking host.
//!
//! The current block holds the word given on the command line. Block edits are
//! written to an output sink (stdout for the CLI) in call order; notifications
//! go to stderr, colored by severity.

use super::{Block, BlockId, Host, Placement, Severity};
use crate::error::ApiError;
use crate::settings::{SettingDescriptor, Settings};
use async_trait::async_trait;
use owo_colors::OwoColorize;
use serde_json::{Map, Value};
use std::io::Write;
use std::sync::Mutex;

const ROOT_BLOCK: &str = "cli-block";

pub struct TerminalHost {
    word: String,
    settings: Settings,
    color: bool,
    out: Mutex<Box<dyn Write + Send>>,
    lines: Mutex<Vec<String>>,
    messages: Mutex<Vec<(Severity, String)>>,
}

impl TerminalHost {
    pub fn new(word: impl Into<String>, settings: Settings) -> Self {
        Self::with_writer(word, settings, Box::new(std::io::stdout()))
    }

    pub fn with_writer(
        word: impl Into<String>,
        settings: Settings,
        out: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            word: word.into(),
            settings,
            color: true,
            out: Mutex::new(out),
            lines: Mutex::new(Vec::new()),
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Lines written so far, in document order.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Notifications shown so far.
    pub fn messages(&self) -> Vec<(Severity, String)> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    fn emit(&self, line: &str, indent: bool) -> Result<(), ApiError> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| ApiError::HostError("output lock poisoned".to_string()))?;
        let prefix = if indent { "  " } else { "" };
        writeln!(out, "{}{}", prefix, line)
            .map_err(|e| ApiError::HostError(format!("Failed to write output: {}", e)))?;
        self.lines
            .lock()
            .map_err(|_| ApiError::HostError("line lock poisoned".to_string()))?
            .push(line.to_string());
        Ok(())
    }
}

#[async_trait]
impl Host for TerminalHost {
    async fn current_block(&self) -> Result<Option<Block>, ApiError> {
        Ok(Some(Block {
            id: BlockId(ROOT_BLOCK.to_string()),
            content: self.word.clone(),
        }))
    }

    async fn settings(&self) -> Result<Map<String, Value>, ApiError> {
        Ok(self.settings.to_map())
    }

    async fn update_block(&self, _id: &BlockId, content: &str) -> Result<(), ApiError> {
        self.emit(content, false)
    }

    async fn insert_block(
        &self,
        anchor: &BlockId,
        content: &str,
        placement: Placement,
    ) -> Result<BlockId, ApiError> {
        self.emit(content, placement == Placement::Child)?;
        let index = self.lines.lock().map(|l| l.len()).unwrap_or_default();
        Ok(BlockId(format!("{}-{}", anchor, index)))
    }

    async fn show_message(&self, message: &str, severity: Severity) -> Result<(), ApiError> {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push((severity, message.to_string()));
        }
        if self.color {
            match severity {
                Severity::Info => eprintln!("{}", message.cyan()),
                Severity::Warning => eprintln!("{}", message.yellow()),
                Severity::Error => eprintln!("{}", message.red().bold()),
                Severity::Success => eprintln!("{}", message.green()),
            }
        } else {
            eprintln!("[{}] {}", severity.as_str(), message);
        }
        Ok(())
    }

    async fn use_settings_schema(&self, _schema: &[SettingDescriptor]) -> Result<(), ApiError> {
        Ok(())
    }
}
