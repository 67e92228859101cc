//! CLI parse: clap types for lexicard. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// lexicard - vocabulary flashcards from an LLM
#[derive(Parser)]
#[command(name = "lexicard")]
#[command(about = "Generate vocabulary flashcards with an LLM backend")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Provider (google, openai, anthropic, ollama, openrouter, custom)
    #[arg(long, global = true)]
    pub provider: Option<String>,

    /// API key for the selected provider
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Base URL override
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Model name override
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a vocabulary card for a word
    Define {
        /// The word to define
        word: String,

        /// Tags appended to the card's first line
        #[arg(long)]
        tags: Option<String>,

        /// Disable colored notifications
        #[arg(long)]
        no_color: bool,
    },
    /// List supported providers and their defaults
    Providers {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the settings form for a provider as JSON
    Schema {
        /// Provider to render the form for (defaults to the configured one)
        #[arg(long)]
        provider: Option<String>,
    },
    /// Configuration file commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,

        /// Destination (defaults to the global config path)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Print the global configuration file path
    Path,
}
