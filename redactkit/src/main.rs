// redactkit/src/main.rs
//! redactkit entry point.
//!
//! Parses the command line, sets up logging and dispatches to a command.

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;
use std::io;

use redactkit::cli::{Cli, Commands};
use redactkit::commands::redact::{run_redact, RedactOptions};
use redactkit::commands::rules::run_rules;
use redactkit::logger;
use redactkit_core::RedactionEngine;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        Some(LevelFilter::Off)
    } else if cli.debug {
        Some(LevelFilter::Debug)
    } else {
        None
    };
    logger::init_logger(level);

    match cli.command {
        Commands::Redact(command) => {
            let engine = RedactionEngine::default();
            run_redact(&engine, RedactOptions::from_command(command, cli.quiet)).await?;
        }
        Commands::Rules(command) => {
            run_rules(command.rules.as_deref(), &mut io::stdout().lock())?;
        }
    }
    Ok(())
}
