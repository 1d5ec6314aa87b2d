//! redaction.rs - Records of individual redaction events.
//!
//! Also provides the logging helpers used when tracing redactions. Secret
//! text never reaches the log unless `REDACTKIT_ALLOW_DEBUG_PII=true` is set.

use log::trace;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static PII_DEBUG_ALLOWED: Lazy<bool> = Lazy::new(|| {
    std::env::var("REDACTKIT_ALLOW_DEBUG_PII")
        .map(|s| s.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
});

/// One match-and-replace event. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Redaction {
    pub redactor_name: String,
    pub characters_removed: usize,
    /// 1-based line within the redactor's view of the stream; 0 for
    /// structural (YAML) redactions.
    pub line: usize,
    pub file: String,
}

/// A redactor that could not run on a file, for example a YAML rule whose
/// input does not parse. The content passed through that redactor unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactionWarning {
    pub redactor_name: String,
    pub file: String,
    pub message: String,
}

/// Every recorded redaction, indexed by redactor name and by file, plus the
/// per-file warnings of redactors that were skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactionList {
    pub by_redactor: BTreeMap<String, Vec<Redaction>>,
    pub by_file: BTreeMap<String, Vec<Redaction>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub warnings: BTreeMap<String, Vec<RedactionWarning>>,
}

impl RedactionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, redaction: Redaction) {
        self.by_file
            .entry(redaction.file.clone())
            .or_default()
            .push(redaction.clone());
        self.by_redactor
            .entry(redaction.redactor_name.clone())
            .or_default()
            .push(redaction);
    }

    pub(crate) fn push_warning(&mut self, warning: RedactionWarning) {
        self.warnings.entry(warning.file.clone()).or_default().push(warning);
    }

    /// Number of recorded warnings across all files.
    pub fn warning_count(&self) -> usize {
        self.warnings.values().map(Vec::len).sum()
    }

    /// Total number of recorded redactions.
    pub fn len(&self) -> usize {
        self.by_file.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_file.is_empty()
    }

    /// Renders the list as a JSON report (`byRedactor` / `byFile`, and
    /// `warnings` when there are any).
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Length-only placeholder for text that must not be logged.
pub fn redact_sensitive(s: &[u8]) -> String {
    const MAX_LEN: usize = 8;
    if s.len() <= MAX_LEN {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED: {} chars]", s.len())
    }
}

fn loggable(content: &[u8]) -> String {
    if *PII_DEBUG_ALLOWED {
        String::from_utf8_lossy(content).into_owned()
    } else {
        redact_sensitive(content)
    }
}

pub(crate) fn log_redaction_trace(redaction: &Redaction, original_line: &[u8]) {
    trace!(
        "Redactor '{}' rewrote {}:{} ({} chars removed). Original='{}'",
        redaction.redactor_name,
        redaction.file,
        redaction.line,
        redaction.characters_removed,
        loggable(original_line)
    );
}
