// redactkit/src/cli.rs
//! Command-line interface of the redactkit binary.
//! License: MIT OR APACHE 2.0

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "redactkit",
    version = env!("CARGO_PKG_VERSION"),
    about = "Redact secrets from collected diagnostic files",
    long_about = "redactkit scrubs collected diagnostic text (logs, manifests, command output) of passwords, tokens, credentials and addresses before it leaves the environment. Built-in rules always run; custom rules are loaded from a YAML rule file and can be scoped to files with globs.",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Disable all log output and the redaction summary. Warnings about
    /// skipped redactors are still printed.
    #[arg(long, short = 'q', global = true, help = "Suppress all log messages and the redaction summary.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG).
    #[arg(long, short = 'd', global = true, conflicts_with = "quiet", help = "Enable debug logging.")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Redacts a file, a directory tree, or stdin.
    #[command(about = "Redact a file, a directory tree, or stdin.")]
    Redact(RedactCommand),

    /// Lists the built-in redactors and the custom rules of a rule file.
    #[command(about = "List built-in redactors and custom rules.")]
    Rules(RulesCommand),
}

/// Arguments for the `redact` command.
#[derive(Args, Debug)]
pub struct RedactCommand {
    /// Path to a YAML rule file with custom `redacts`.
    #[arg(long, short = 'r', value_name = "FILE", env = "REDACTKIT_RULES", help = "Path to a YAML file of custom redaction rules.")]
    pub rules: Option<PathBuf>,

    /// File or directory to redact (reads stdin if not provided).
    #[arg(long, short = 'i', value_name = "PATH", help = "File or directory to redact. Reads stdin if omitted.")]
    pub input: Option<PathBuf>,

    /// Where to write redacted output. Required when the input is a directory.
    #[arg(long, short = 'o', value_name = "PATH", help = "Write output here instead of stdout. Required for directory input.")]
    pub output: Option<PathBuf>,

    /// Write the redaction ledger as JSON.
    #[arg(long, value_name = "FILE", help = "Write the list of redactions performed as JSON.")]
    pub report: Option<PathBuf>,

    /// Suppress the redaction summary.
    #[arg(long = "no-summary", help = "Do not print the redaction summary table.")]
    pub no_summary: bool,
}

/// Arguments for the `rules` command.
#[derive(Args, Debug)]
pub struct RulesCommand {
    /// Path to a YAML rule file with custom `redacts`.
    #[arg(long, short = 'r', value_name = "FILE", env = "REDACTKIT_RULES", help = "Also list the rules of this YAML rule file.")]
    pub rules: Option<PathBuf>,
}
