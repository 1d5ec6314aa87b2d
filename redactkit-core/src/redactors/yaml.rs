// redactkit-core/src/redactors/yaml.rs
//! A `Redactor` that masks values inside a YAML document by path.
//!
//! Paths are dot separated (`spec.containers.*.env`), with `[n]` accepted as
//! an index shorthand (`items[0].password`). On a mapping each segment is a
//! glob matched against the keys; on a sequence `*` selects every element and
//! a number selects one.
//!
//! Unlike the line redactors this stage needs the whole document, so it
//! buffers its upstream before emitting anything. When the document does not
//! parse, or the path selects nothing, the input passes through unchanged.
//! A parse failure is also recorded as a `RedactionWarning` in the ledger.
//!
//! License: MIT OR APACHE 2.0

use glob::Pattern;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_yml::Value;
use std::io::{self, Cursor};
use std::sync::Arc;

use crate::compiler::MASK_TEXT;
use crate::errors::{RedactionError, Result};
use crate::ledger::RedactionLedger;
use crate::line_reader::{collect_lines, Line, LineReader, LineStream};
use crate::redaction::{Redaction, RedactionWarning};
use crate::redactor::Redactor;

static INDEXED_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<head>[^\[\]]*)(?P<indices>(?:\[(?:\d+|\*)\])+)$").expect("index segment pattern is valid")
});

static INDEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(\d+|\*)\]").expect("index pattern is valid"));

#[derive(Debug)]
struct PathSegment {
    raw: String,
    pattern: Pattern,
}

impl PathSegment {
    fn new(raw: &str) -> Result<Self> {
        let pattern = Pattern::new(raw).map_err(|source| RedactionError::InvalidGlob {
            pattern: raw.to_string(),
            source,
        })?;
        Ok(Self {
            raw: raw.to_string(),
            pattern,
        })
    }

    fn matches_key(&self, key: &Value) -> bool {
        match key {
            Value::String(s) => self.pattern.matches(s),
            Value::Number(n) => self.pattern.matches(&n.to_string()),
            Value::Bool(b) => self.pattern.matches(&b.to_string()),
            _ => false,
        }
    }

    fn matches_index(&self, index: usize) -> bool {
        self.raw == "*" || self.raw.parse::<usize>().map_or(false, |i| i == index)
    }
}

/// Splits a document path into segments, expanding `[n]` suffixes.
fn parse_path(path: &str) -> Result<Vec<PathSegment>> {
    if path.trim().is_empty() {
        return Err(RedactionError::invalid_rule(path, "yaml path is empty"));
    }
    let mut segments = Vec::new();
    for piece in path.split('.') {
        if piece.is_empty() {
            return Err(RedactionError::invalid_rule(path, "yaml path has an empty segment"));
        }
        match INDEXED_SEGMENT.captures(piece) {
            Some(caps) => {
                let head = caps.name("head").map_or("", |m| m.as_str());
                if !head.is_empty() {
                    segments.push(PathSegment::new(head)?);
                }
                let indices = caps.name("indices").map_or("", |m| m.as_str());
                for index in INDEX.captures_iter(indices) {
                    segments.push(PathSegment::new(&index[1])?);
                }
            }
            None => segments.push(PathSegment::new(piece)?),
        }
    }
    Ok(segments)
}

#[derive(Debug)]
pub struct YamlRedactor {
    path: String,
    segments: Arc<Vec<PathSegment>>,
    name: String,
    file: String,
}

impl YamlRedactor {
    pub fn new(path: &str, file: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        Ok(Self {
            path: path.to_string(),
            segments: Arc::new(parse_path(path)?),
            name: name.into(),
            file: file.into(),
        })
    }

    /// The document path this redactor targets.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Redactor for YamlRedactor {
    fn name(&self) -> &str {
        &self.name
    }

    fn file(&self) -> &str {
        &self.file
    }

    fn redact<'a>(&self, input: LineStream<'a>, ledger: &RedactionLedger) -> LineStream<'a> {
        Box::new(YamlStream {
            state: YamlState::Buffering(input),
            segments: Arc::clone(&self.segments),
            name: self.name.clone(),
            file: self.file.clone(),
            ledger: ledger.clone(),
        })
    }
}

/// Redacts every value reached by `segments` in `input`.
///
/// Returns `Ok(None)` when the path selects nothing, otherwise the
/// re-serialized document and the number of characters replaced.
fn redact_document(input: &[u8], segments: &[PathSegment], file: &str) -> Result<Option<(Vec<u8>, usize)>> {
    if input.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let mut document: Value = serde_yml::from_slice(input).map_err(|e| RedactionError::StructuralParse {
        file: file.to_string(),
        reason: e.to_string(),
    })?;

    let mut removed = 0usize;
    if !redact_value(&mut document, segments, &mut removed) {
        return Ok(None);
    }

    let rendered = serde_yml::to_string(&document).map_err(|e| RedactionError::StructuralParse {
        file: file.to_string(),
        reason: format!("could not re-serialize redacted document: {}", e),
    })?;
    Ok(Some((rendered.into_bytes(), removed)))
}

fn redact_value(value: &mut Value, segments: &[PathSegment], removed: &mut usize) -> bool {
    let Some((segment, rest)) = segments.split_first() else {
        return false;
    };
    let mut changed = false;
    match value {
        Value::Mapping(map) => {
            for (key, child) in map.iter_mut() {
                if segment.matches_key(key) {
                    changed |= redact_child(child, rest, removed);
                }
            }
        }
        Value::Sequence(items) => {
            for (index, child) in items.iter_mut().enumerate() {
                if segment.matches_index(index) {
                    changed |= redact_child(child, rest, removed);
                }
            }
        }
        _ => {}
    }
    changed
}

fn redact_child(child: &mut Value, rest: &[PathSegment], removed: &mut usize) -> bool {
    if !rest.is_empty() {
        return redact_value(child, rest, removed);
    }
    *removed += rendered_len(child);
    *child = Value::String(MASK_TEXT.to_string());
    true
}

fn rendered_len(value: &Value) -> usize {
    match value {
        Value::String(s) => s.len(),
        Value::Null => 0,
        other => serde_yml::to_string(other)
            .map(|s| s.trim_end().len())
            .unwrap_or(0),
    }
}

enum YamlState<'a> {
    Buffering(LineStream<'a>),
    Draining(LineReader<Cursor<Vec<u8>>>),
    Done,
}

struct YamlStream<'a> {
    state: YamlState<'a>,
    segments: Arc<Vec<PathSegment>>,
    name: String,
    file: String,
    ledger: RedactionLedger,
}

impl YamlStream<'_> {
    fn process(&self, original: Vec<u8>) -> Vec<u8> {
        match redact_document(&original, &self.segments, &self.file) {
            Ok(Some((redacted, removed))) => {
                debug!("Redactor '{}' masked {} chars in {}", self.name, removed, self.file);
                self.ledger.record(Redaction {
                    redactor_name: self.name.clone(),
                    characters_removed: removed,
                    line: 0,
                    file: self.file.clone(),
                });
                redacted
            }
            Ok(None) => original,
            Err(e) => {
                warn!("Redactor '{}' skipped: {}", self.name, e);
                self.ledger.warn(RedactionWarning {
                    redactor_name: self.name.clone(),
                    file: self.file.clone(),
                    message: e.to_string(),
                });
                original
            }
        }
    }
}

impl Iterator for YamlStream<'_> {
    type Item = io::Result<Line>;

    fn next(&mut self) -> Option<Self::Item> {
        if matches!(self.state, YamlState::Buffering(_)) {
            let YamlState::Buffering(upstream) = std::mem::replace(&mut self.state, YamlState::Done) else {
                return None;
            };
            match collect_lines(upstream) {
                Ok(buffered) => {
                    let output = self.process(buffered);
                    self.state = YamlState::Draining(LineReader::new(Cursor::new(output)));
                }
                Err(e) => return Some(Err(e)),
            }
        }
        match &mut self.state {
            YamlState::Draining(lines) => lines.next(),
            _ => None,
        }
    }
}
