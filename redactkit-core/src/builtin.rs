// redactkit-core/src/builtin.rs
//! The default rule table every file is redacted with.
//!
//! The table is embedded from `config/default_rules.yaml` and compiled on
//! first use. Compiled patterns are shared between all redactors built from
//! them, so building a chain per file only allocates names.
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::sync::Arc;

use crate::compiler::{compile_pattern, CompiledPattern};
use crate::config::MultiLinePair;
use crate::errors::{RedactionError, Result};
use crate::redactor::Redactor;
use crate::redactors::{MultiLineRedactor, SingleLineRedactor};

const DEFAULT_RULES_YAML: &str = include_str!("../config/default_rules.yaml");

static BUILTIN_RULES: OnceCell<Arc<BuiltinRules>> = OnceCell::new();

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RuleTable {
    single_line: Vec<String>,
    multi_line: Vec<MultiLinePair>,
}

#[derive(Debug)]
struct BuiltinSingleLine {
    name: String,
    pattern: Arc<CompiledPattern>,
}

#[derive(Debug)]
struct BuiltinMultiLine {
    name: String,
    selector: Arc<CompiledPattern>,
    redactor: Arc<CompiledPattern>,
}

/// The compiled default rules.
#[derive(Debug)]
pub struct BuiltinRules {
    single_line: Vec<BuiltinSingleLine>,
    multi_line: Vec<BuiltinMultiLine>,
}

impl BuiltinRules {
    fn compile(yaml: &str) -> Result<Self> {
        let table: RuleTable = serde_yml::from_str(yaml)
            .map_err(|e| RedactionError::Config(format!("failed to parse built-in rules: {}", e)))?;

        let single_line = table
            .single_line
            .iter()
            .enumerate()
            .map(|(i, pattern)| {
                Ok(BuiltinSingleLine {
                    name: format!("defaultRegex.{}-{:?}", i, pattern),
                    pattern: Arc::new(compile_pattern(pattern)?),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let multi_line = table
            .multi_line
            .iter()
            .enumerate()
            .map(|(i, pair)| {
                Ok(BuiltinMultiLine {
                    name: format!("defaultMultiLine.{}-{:?}", i, pair.selector),
                    selector: Arc::new(compile_pattern(&pair.selector)?),
                    redactor: Arc::new(compile_pattern(&pair.redactor)?),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Compiled {} single-line and {} multi-line built-in rules.",
            single_line.len(),
            multi_line.len()
        );
        Ok(Self { single_line, multi_line })
    }

    /// Builds the built-in chain for `path`: every single-line rule, then
    /// every multi-line rule.
    pub fn redactors(&self, path: &str) -> Vec<Box<dyn Redactor>> {
        let mut redactors: Vec<Box<dyn Redactor>> = Vec::with_capacity(self.len());
        for rule in &self.single_line {
            redactors.push(Box::new(SingleLineRedactor::with_pattern(
                Arc::clone(&rule.pattern),
                path,
                rule.name.as_str(),
            )));
        }
        for rule in &self.multi_line {
            redactors.push(Box::new(MultiLineRedactor::with_patterns(
                Arc::clone(&rule.selector),
                Arc::clone(&rule.redactor),
                path,
                rule.name.as_str(),
            )));
        }
        redactors
    }

    /// Redactor names in chain order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.single_line
            .iter()
            .map(|r| r.name.as_str())
            .chain(self.multi_line.iter().map(|r| r.name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.single_line.len() + self.multi_line.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Returns the process-wide compiled default rules, compiling them on the
/// first call.
pub fn builtin_rules() -> Result<Arc<BuiltinRules>> {
    BUILTIN_RULES
        .get_or_try_init(|| BuiltinRules::compile(DEFAULT_RULES_YAML).map(Arc::new))
        .map(Arc::clone)
}
