//! lexicard CLI Binary
//!
//! Command-line front end: the word given on the command line plays the
//! current block, card lines go to stdout and notices to stderr.

use clap::Parser;
use lexicard::cli::{map_error, Cli, RunContext};
use lexicard::config::{ConfigLoader, ConfigOverrides};
use lexicard::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let logging_config = build_logging_config(&cli);
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("lexicard starting");

    let context = match RunContext::new(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error loading configuration: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    };

    match context.execute(&cli.command) {
        Ok(result) => {
            if !result.output.is_empty() {
                println!("{}", result.output);
            }
            if result.exit_code != 0 {
                process::exit(result.exit_code);
            }
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    }
}

/// Logging comes up before the full configuration is validated, so a broken
/// config file still gets logged about. Flags win over the file.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let overrides = ConfigOverrides {
        log_level: cli.log_level.clone(),
        log_format: cli.log_format.clone(),
        ..Default::default()
    };
    ConfigLoader::load(cli.config.as_deref(), &overrides)
        .map(|c| c.logging)
        .unwrap_or_else(|_| {
            let mut config = LoggingConfig::default();
            if let Some(level) = &cli.log_level {
                config.level = level.clone();
            }
            if let Some(format) = &cli.log_format {
                config.format = format.clone();
            }
            config
        })
}
