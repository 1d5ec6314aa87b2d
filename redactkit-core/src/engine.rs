// redactkit-core/src/engine.rs
//! Assembles redaction chains and runs content through them.
//!
//! A chain for one file is the built-in redactors (every single-line rule,
//! then every multi-line rule) followed by the redactors of each custom rule
//! whose globs match the file. Each stage wraps the stream of the stage
//! before it, so content is pulled through the whole chain one line at a
//! time.
//!
//! [`RedactionEngine`] carries the ledger the chain reports to. The free
//! functions [`redact`], [`get_redaction_list`] and [`reset_redaction_list`]
//! use the process-wide ledger.
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use std::io::{BufRead, Cursor};

use crate::builtin::builtin_rules;
use crate::config::RuleSpec;
use crate::errors::{RedactionError, Result};
use crate::ledger::{default_ledger, RedactionLedger};
use crate::line_reader::{collect_lines, line_stream, LineStream, LineStreamReader};
use crate::redaction::RedactionList;
use crate::redactor::Redactor;
use crate::redactors::{LiteralRedactor, MultiLineRedactor, SingleLineRedactor, YamlRedactor};

/// A `Read` over the output of a redaction chain.
pub type RedactingReader<'a> = LineStreamReader<'a>;

/// Runs redaction chains and reports to one ledger.
#[derive(Debug, Clone)]
pub struct RedactionEngine {
    ledger: RedactionLedger,
}

impl Default for RedactionEngine {
    /// An engine reporting to the process-wide ledger.
    fn default() -> Self {
        Self::new(default_ledger().clone())
    }
}

impl RedactionEngine {
    pub fn new(ledger: RedactionLedger) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &RedactionLedger {
        &self.ledger
    }

    /// Redacts `content` as the file at `path` and returns the result.
    ///
    /// Output is all or nothing: if any rule cannot be built or the stream
    /// fails, no output is returned.
    pub fn redact(&self, content: &[u8], path: &str, rules: &[RuleSpec]) -> Result<Vec<u8>> {
        let stream = self.chain(line_stream(Cursor::new(content)), path, rules)?;
        let redacted = collect_lines(stream).map_err(RedactionError::Read)?;
        debug!("Redacted {} ({} -> {} bytes)", path, content.len(), redacted.len());
        Ok(redacted)
    }

    /// Like [`redact`](Self::redact), but streams: the returned reader pulls
    /// from `reader` only as its own output is read.
    pub fn redact_reader<'a, R>(&self, reader: R, path: &str, rules: &[RuleSpec]) -> Result<RedactingReader<'a>>
    where
        R: BufRead + Send + 'a,
    {
        let stream = self.chain(line_stream(reader), path, rules)?;
        Ok(LineStreamReader::new(stream))
    }

    /// Every redactor that applies to `path`, in chain order.
    pub fn build_redactors(&self, path: &str, rules: &[RuleSpec]) -> Result<Vec<Box<dyn Redactor>>> {
        let mut redactors = builtin_rules()?.redactors(path);
        redactors.extend(build_custom_redactors(path, rules)?);
        Ok(redactors)
    }

    fn chain<'a>(&self, input: LineStream<'a>, path: &str, rules: &[RuleSpec]) -> Result<LineStream<'a>> {
        let redactors = self.build_redactors(path, rules)?;
        debug!("Built a chain of {} redactors for {}", redactors.len(), path);
        Ok(redactors
            .iter()
            .fold(input, |stream, redactor| redactor.redact(stream, &self.ledger)))
    }
}

/// Builds the redactors of every rule that applies to `path`.
///
/// Within a rule the order is regex, values, multiLine, yaml.
pub fn build_custom_redactors(path: &str, rules: &[RuleSpec]) -> Result<Vec<Box<dyn Redactor>>> {
    let mut redactors: Vec<Box<dyn Redactor>> = Vec::new();

    for (index, rule) in rules.iter().enumerate() {
        if !rule.applies_to(path)? {
            continue;
        }

        let mut within = 0usize;
        let mut next_name = |kind: &str| {
            let name = redactor_name(index, within, rule.name.as_deref(), kind);
            within += 1;
            name
        };

        for pattern in &rule.regex {
            redactors.push(Box::new(SingleLineRedactor::new(pattern, path, next_name("regex"))?));
        }
        for value in &rule.values {
            redactors.push(Box::new(LiteralRedactor::new(value, path, next_name("literal"))?));
        }
        for pair in &rule.multi_line {
            let name = next_name("multiLine");
            if pair.selector.is_empty() || pair.redactor.is_empty() {
                return Err(RedactionError::invalid_rule(
                    name,
                    "multiLine entries need both a selector and a redactor",
                ));
            }
            redactors.push(Box::new(MultiLineRedactor::new(&pair.selector, &pair.redactor, path, name)?));
        }
        for yaml_path in &rule.yaml {
            redactors.push(Box::new(YamlRedactor::new(yaml_path, path, next_name("yaml"))?));
        }
    }
    Ok(redactors)
}

/// Name recorded for entry `within` of custom rule `rule_index`.
pub fn redactor_name(rule_index: usize, within: usize, name: Option<&str>, kind: &str) -> String {
    match name.filter(|n| !n.is_empty()) {
        Some(name) => format!("{}-{}", name, within),
        None => format!("unnamed-{}.{}-{}", rule_index, within, kind),
    }
}

/// Redacts `content` with the process-wide ledger.
pub fn redact(content: &[u8], path: &str, rules: &[RuleSpec]) -> Result<Vec<u8>> {
    RedactionEngine::default().redact(content, path, rules)
}

/// Snapshot of the process-wide ledger, including every redaction from
/// calls that returned before this one.
///
/// # Panics
///
/// Panics when called from within an async runtime, because it blocks on
/// the ledger worker. Use `default_ledger().snapshot_async()` there.
pub fn get_redaction_list() -> RedactionList {
    default_ledger().snapshot()
}

/// Clears the process-wide ledger.
///
/// # Panics
///
/// Panics when called from within an async runtime. Use
/// `default_ledger().reset_async()` there.
pub fn reset_redaction_list() {
    default_ledger().reset()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MultiLinePair;
    use std::io::Read;

    fn engine() -> RedactionEngine {
        RedactionEngine::new(RedactionLedger::new())
    }

    #[test]
    fn test_names_are_unique_within_a_rule() {
        let rules = vec![
            RuleSpec {
                name: Some("mine".to_string()),
                regex: vec!["a".to_string(), "b".to_string()],
                values: vec!["c".to_string()],
                ..Default::default()
            },
            RuleSpec {
                regex: vec!["d".to_string()],
                yaml: vec!["x.y".to_string()],
                ..Default::default()
            },
        ];
        let names: Vec<String> = build_custom_redactors("f", &rules)
            .unwrap()
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(names, vec!["mine-0", "mine-1", "mine-2", "unnamed-1.0-regex", "unnamed-1.1-yaml"]);
    }

    #[test]
    fn test_custom_rules_follow_builtins() {
        let rules = vec![RuleSpec {
            values: vec!["zzz".to_string()],
            ..Default::default()
        }];
        let redactors = engine().build_redactors("f", &rules).unwrap();
        let builtin_count = builtin_rules().unwrap().len();
        assert_eq!(redactors.len(), builtin_count + 1);
        assert_eq!(redactors[builtin_count].name(), "unnamed-0.0-literal");
        assert_eq!(redactors[builtin_count].file(), "f");
    }

    #[test]
    fn test_empty_multiline_half_fails_the_call() {
        let rules = vec![RuleSpec {
            multi_line: vec![MultiLinePair {
                selector: String::new(),
                redactor: "x".to_string(),
            }],
            ..Default::default()
        }];
        let err = engine().redact(b"x\n", "f", &rules).unwrap_err();
        assert!(matches!(err, RedactionError::InvalidRule { .. }));
    }

    #[test]
    fn test_bad_regex_fails_the_call() {
        let rules = vec![RuleSpec {
            regex: vec!["(".to_string()],
            ..Default::default()
        }];
        let err = engine().redact(b"x\n", "f", &rules).unwrap_err();
        assert!(matches!(err, RedactionError::Compile { .. }));
    }

    #[test]
    fn test_bad_glob_fails_the_call() {
        let rules = vec![RuleSpec {
            file: Some("logs/[".to_string()),
            values: vec!["x".to_string()],
            ..Default::default()
        }];
        let err = engine().redact(b"x\n", "f", &rules).unwrap_err();
        assert!(matches!(err, RedactionError::InvalidGlob { .. }));
    }

    #[test]
    fn test_reader_matches_buffered_output() {
        let input = "token=abc\nserver 10.1.2.3\nplain";
        let rules = vec![RuleSpec {
            regex: vec![r"(token=)(?P<mask>\w+)".to_string()],
            ..Default::default()
        }];
        let engine = engine();
        let buffered = engine.redact(input.as_bytes(), "f", &rules).unwrap();

        let mut streamed = Vec::new();
        engine
            .redact_reader(Cursor::new(input.as_bytes()), "f", &rules)
            .unwrap()
            .read_to_end(&mut streamed)
            .unwrap();
        assert_eq!(streamed, buffered);
        assert_eq!(
            String::from_utf8(buffered).unwrap(),
            "token=***HIDDEN***\nserver ***HIDDEN***\nplain"
        );
    }
}
