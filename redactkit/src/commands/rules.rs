// redactkit/src/commands/rules.rs
//! The `rules` command: lists what a redaction run would apply.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use redactkit_core::builtin::builtin_rules;

use crate::commands::load_rules;

/// Writes the built-in redactor names, then one line per custom rule.
pub fn run_rules<W: Write>(rules_path: Option<&Path>, out: &mut W) -> Result<()> {
    let builtins = builtin_rules().context("Failed to compile built-in rules")?;
    writeln!(out, "Built-in redactors ({}):", builtins.len())?;
    for name in builtins.names() {
        writeln!(out, "  {}", name)?;
    }

    let Some(path) = rules_path else {
        return Ok(());
    };
    let rules = load_rules(Some(path))?;
    writeln!(out, "Custom rules from {} ({}):", path.display(), rules.len())?;
    for (index, rule) in rules.iter().enumerate() {
        let scope: Vec<&str> = rule.globs().collect();
        writeln!(
            out,
            "  {}: regex={} values={} multiLine={} yaml={} files={}",
            rule.label(index),
            rule.regex.len(),
            rule.values.len(),
            rule.multi_line.len(),
            rule.yaml.len(),
            if scope.is_empty() { "*".to_string() } else { scope.join(",") },
        )?;
    }
    Ok(())
}
