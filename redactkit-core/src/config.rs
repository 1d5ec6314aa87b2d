//! Configuration management for `redactkit-core`.
//!
//! This module defines the custom redaction rule format and loads it from
//! YAML. A rule file looks like:
//!
//! ```yaml
//! redacts:
//!   - name: app-tokens
//!     file: "logs/*.log"
//!     regex: ['(token=)(?P<mask>\w+)']
//!     values: ["literal-secret"]
//!     multiLine:
//!       - selector: '(?i)"name": *"api_key"'
//!         redactor: '("value": *")(?P<mask>[^"]*)(")'
//!     yaml: ["spec.password"]
//! ```
//!
//! License: MIT OR APACHE 2.0

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::compiler::compile_pattern;
use crate::errors::{RedactionError, Result};
use crate::path_match::FileGlob;
use crate::redactors::YamlRedactor;

/// Separator used when matching rule globs against file paths.
pub const PATH_SEPARATOR: char = '/';

/// A selector/redactor pair for multi-line redaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MultiLinePair {
    /// Pattern the gating line must match.
    pub selector: String,
    /// Pattern applied to the line after a selector match.
    pub redactor: String,
}

/// One custom redaction rule.
///
/// A rule without `file` and `files` applies to every path; otherwise it
/// applies when any of its globs matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct RuleSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub files: Vec<String>,
    pub regex: Vec<String>,
    pub values: Vec<String>,
    pub multi_line: Vec<MultiLinePair>,
    pub yaml: Vec<String>,
}

impl RuleSpec {
    /// Globs scoping this rule, `file` first.
    pub fn globs(&self) -> impl Iterator<Item = &str> {
        self.file
            .iter()
            .filter(|f| !f.is_empty())
            .chain(self.files.iter())
            .map(String::as_str)
    }

    /// Whether this rule should run for `path`.
    pub fn applies_to(&self, path: &str) -> Result<bool> {
        let mut scoped = false;
        for glob in self.globs() {
            scoped = true;
            if FileGlob::new(glob, PATH_SEPARATOR)?.matches(path) {
                return Ok(true);
            }
        }
        Ok(!scoped)
    }

    /// Number of redactors this rule expands into.
    pub fn entry_count(&self) -> usize {
        self.regex.len() + self.values.len() + self.multi_line.len() + self.yaml.len()
    }

    /// Human-readable label for messages.
    pub fn label(&self, index: usize) -> String {
        match self.name.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => format!("'{}'", name),
            None => format!("#{}", index),
        }
    }

    /// Collects every problem with this rule instead of stopping at the
    /// first one.
    pub fn problems(&self, index: usize) -> Vec<String> {
        let label = self.label(index);
        let mut problems = Vec::new();

        for glob in self.globs() {
            if let Err(e) = FileGlob::new(glob, PATH_SEPARATOR) {
                problems.push(format!("Rule {}: {}", label, e));
            }
        }
        for pattern in &self.regex {
            if let Err(e) = compile_pattern(pattern) {
                problems.push(format!("Rule {}: {}", label, e));
            }
        }
        for pair in &self.multi_line {
            if pair.selector.is_empty() || pair.redactor.is_empty() {
                problems.push(format!(
                    "Rule {}: multiLine entries need both a selector and a redactor.",
                    label
                ));
                continue;
            }
            for pattern in [&pair.selector, &pair.redactor] {
                if let Err(e) = compile_pattern(pattern) {
                    problems.push(format!("Rule {}: {}", label, e));
                }
            }
        }
        for path in &self.yaml {
            if let Err(e) = YamlRedactor::new(path, "", "") {
                problems.push(format!("Rule {}: {}", label, e));
            }
        }
        if self.entry_count() == 0 {
            problems.push(format!("Rule {} has no regex, values, multiLine or yaml entries.", label));
        }
        problems
    }
}

/// Top-level structure of a rule file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RedactConfig {
    pub redacts: Vec<RuleSpec>,
}

impl RedactConfig {
    /// Loads and validates custom rules from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading custom redaction rules from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .map_err(|e| RedactionError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        let config = Self::from_yaml_str(&text).map_err(|e| match e {
            RedactionError::Config(msg) => RedactionError::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;
        info!("Loaded {} rules from file {}.", config.redacts.len(), path.display());
        Ok(config)
    }

    /// Parses and validates custom rules from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: RedactConfig = if text.trim().is_empty() {
            RedactConfig::default()
        } else {
            serde_yml::from_str(text).map_err(|e| RedactionError::Config(format!("failed to parse rules: {}", e)))?
        };
        config.validate()?;
        debug!("Validated {} custom rules.", config.redacts.len());
        Ok(config)
    }

    /// Checks that every rule can be built.
    pub fn validate(&self) -> Result<()> {
        let errors: Vec<String> = self
            .redacts
            .iter()
            .enumerate()
            .flat_map(|(i, rule)| rule.problems(i))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(RedactionError::Config(format!(
                "Rule validation failed:\n{}",
                errors.join("\n")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_camel_case_fields() {
        let config = RedactConfig::from_yaml_str(
            r#"
redacts:
  - name: pairs
    files: ["a/*", "b/*"]
    multiLine:
      - selector: 'user'
        redactor: '(pw=)(?P<mask>\S+)'
"#,
        )
        .unwrap();
        let rule = &config.redacts[0];
        assert_eq!(rule.files.len(), 2);
        assert_eq!(rule.multi_line[0].selector, "user");
        assert_eq!(rule.entry_count(), 1);
    }

    #[test]
    fn test_unscoped_rule_applies_everywhere() {
        let rule = RuleSpec {
            values: vec!["x".to_string()],
            ..Default::default()
        };
        assert!(rule.applies_to("anything/at/all.txt").unwrap());
    }

    #[test]
    fn test_scoped_rule_checks_every_glob() {
        let rule = RuleSpec {
            file: Some("logs/*.log".to_string()),
            files: vec!["config/*.yaml".to_string()],
            values: vec!["x".to_string()],
            ..Default::default()
        };
        assert!(rule.applies_to("logs/app.log").unwrap());
        assert!(rule.applies_to("config/app.yaml").unwrap());
        assert!(!rule.applies_to("other/app.yaml").unwrap());
    }

    #[test]
    fn test_validation_reports_every_problem() {
        let err = RedactConfig::from_yaml_str(
            r#"
redacts:
  - name: broken
    file: "logs/["
    regex: ["(unclosed"]
    multiLine:
      - selector: ""
        redactor: "x"
  - values: []
"#,
        )
        .unwrap_err()
        .to_string();
        assert!(err.contains("invalid file glob"));
        assert!(err.contains("failed to compile pattern"));
        assert!(err.contains("selector and a redactor"));
        assert!(err.contains("Rule #1 has no regex"));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(RedactConfig::from_yaml_str("redacts:\n  - regexes: ['x']\n").is_err());
    }

    #[test]
    fn test_empty_text_is_empty_config() {
        assert!(RedactConfig::from_yaml_str("").unwrap().redacts.is_empty());
    }
}
