// redactkit/src/commands/mod.rs
//! Implementations of the CLI subcommands.

pub mod redact;
pub mod rules;

use anyhow::{Context, Result};
use std::path::Path;

use redactkit_core::{RedactConfig, RuleSpec};

/// Loads custom rules from `path`, or none.
pub fn load_rules(path: Option<&Path>) -> Result<Vec<RuleSpec>> {
    match path {
        Some(path) => {
            let config = RedactConfig::load_from_file(path)
                .with_context(|| format!("Failed to load rule file: {}", path.display()))?;
            Ok(config.redacts)
        }
        None => Ok(Vec::new()),
    }
}
