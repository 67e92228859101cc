//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; a single route table dispatches to the library.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, ConfigCommands};
pub use presentation::{format_provider_table, format_providers_json, format_schema_json};
pub use route::{RunContext, RunOutput};
