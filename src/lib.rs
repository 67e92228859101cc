//! lexicard: vocabulary flashcards from an LLM
//!
//! Generates a structured word definition through one of several LLM
//! backends and renders it as a block of flashcard lines for a note-taking
//! host. Backends that cannot do schema-constrained output fall back to a
//! plain-text request whose answer is parsed and validated the same way.

pub mod card;
pub mod cli;
pub mod command;
pub mod config;
pub mod definition;
pub mod error;
pub mod generation;
pub mod host;
pub mod logging;
pub mod provider;
pub mod settings;
