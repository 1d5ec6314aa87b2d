// redactkit-core/src/redactors/multi_line.rs
//! A `Redactor` for secrets whose key and value sit on consecutive lines.
//!
//! When a line matches the selector, the line after it is run through the
//! redactor pattern. The two lines are consumed as a pair: the selector line
//! is never modified and the redacted line is not reconsidered as a
//! selector. At most one line is held back at any time.
//!
//! License: MIT OR APACHE 2.0

use std::io;
use std::sync::Arc;

use crate::compiler::{compile_pattern, CompiledPattern};
use crate::errors::Result;
use crate::ledger::RedactionLedger;
use crate::line_reader::{Line, LineStream};
use crate::redaction::{log_redaction_trace, Redaction};
use crate::redactor::Redactor;

#[derive(Debug)]
pub struct MultiLineRedactor {
    selector: Arc<CompiledPattern>,
    redactor: Arc<CompiledPattern>,
    name: String,
    file: String,
}

impl MultiLineRedactor {
    /// Compiles both patterns; either one failing is a compile error.
    pub fn new(selector: &str, redactor: &str, file: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let selector = Arc::new(compile_pattern(selector)?);
        let redactor = Arc::new(compile_pattern(redactor)?);
        Ok(Self::with_patterns(selector, redactor, file, name))
    }

    pub fn with_patterns(
        selector: Arc<CompiledPattern>,
        redactor: Arc<CompiledPattern>,
        file: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            selector,
            redactor,
            name: name.into(),
            file: file.into(),
        }
    }
}

impl Redactor for MultiLineRedactor {
    fn name(&self) -> &str {
        &self.name
    }

    fn file(&self) -> &str {
        &self.file
    }

    fn redact<'a>(&self, input: LineStream<'a>, ledger: &RedactionLedger) -> LineStream<'a> {
        Box::new(MultiLineStream {
            upstream: input,
            selector: Arc::clone(&self.selector),
            redactor: Arc::clone(&self.redactor),
            name: self.name.clone(),
            file: self.file.clone(),
            ledger: ledger.clone(),
            held: None,
            line_number: 0,
        })
    }
}

struct MultiLineStream<'a> {
    upstream: LineStream<'a>,
    selector: Arc<CompiledPattern>,
    redactor: Arc<CompiledPattern>,
    name: String,
    file: String,
    ledger: RedactionLedger,
    /// The line following a selector match, already processed.
    held: Option<io::Result<Line>>,
    line_number: usize,
}

impl MultiLineStream<'_> {
    fn redact_following(&mut self, mut line: Line) -> Line {
        if let Some(replacement) = self.redactor.replace(&line.content) {
            let redaction = Redaction {
                redactor_name: self.name.clone(),
                characters_removed: replacement.characters_removed,
                line: self.line_number,
                file: self.file.clone(),
            };
            log_redaction_trace(&redaction, &line.content);
            self.ledger.record(redaction);
            line.content = replacement.output;
        }
        line
    }
}

impl Iterator for MultiLineStream<'_> {
    type Item = io::Result<Line>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(held) = self.held.take() {
            return Some(held);
        }

        let line = match self.upstream.next()? {
            Ok(line) => line,
            Err(e) => return Some(Err(e)),
        };
        self.line_number += 1;

        if self.selector.is_match(&line.content) {
            self.held = match self.upstream.next() {
                Some(Ok(following)) => {
                    self.line_number += 1;
                    Some(Ok(self.redact_following(following)))
                }
                other => other,
            };
        }
        Some(Ok(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redactors::test_support::run;

    const SELECTOR: &str = r#"(?i)"name": *".*password[^"]*""#;
    const VALUE: &str = r#"(?i)("value": *")(?P<mask>.*[^"]*)(")"#;

    fn redactor() -> MultiLineRedactor {
        MultiLineRedactor::new(SELECTOR, VALUE, "pod.json", "pw").unwrap()
    }

    #[test]
    fn test_redacts_line_after_selector() {
        let input = "{\n  \"name\": \"DB_PASSWORD\",\n  \"value\": \"hunter2\"\n}\n";
        let (out, list) = run(&redactor(), input);
        assert_eq!(
            out,
            "{\n  \"name\": \"DB_PASSWORD\",\n  \"value\": \"***HIDDEN***\"\n}\n"
        );
        let records = &list.by_redactor["pw"];
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].line, 3);
        assert_eq!(records[0].characters_removed, 7);
    }

    #[test]
    fn test_value_without_selector_is_untouched() {
        let input = "\"name\": \"HOSTNAME\"\n\"value\": \"db.local\"\n";
        let (out, list) = run(&redactor(), input);
        assert_eq!(out, input);
        assert!(list.is_empty());
    }

    #[test]
    fn test_selector_followed_by_non_matching_line() {
        let input = "\"name\": \"PASSWORD\"\nsomething else\n";
        let (out, list) = run(&redactor(), input);
        assert_eq!(out, input);
        assert!(list.is_empty());
    }

    #[test]
    fn test_selector_at_end_of_stream() {
        let input = "\"value\": \"x\"\n\"name\": \"PASSWORD\"";
        let (out, list) = run(&redactor(), input);
        assert_eq!(out, input);
        assert!(list.is_empty());
    }

    #[test]
    fn test_selector_line_is_never_modified() {
        let selector = r"(secret)";
        let value = r"(?P<mask>secret)";
        let redactor = MultiLineRedactor::new(selector, value, "f", "s").unwrap();
        let (out, list) = run(&redactor, "secret\nsecret\nsecret\n");
        // Lines 1 and 2 form a pair; line 3 starts a new pair with no follower.
        assert_eq!(out, "secret\n***HIDDEN***\nsecret\n");
        assert_eq!(list.by_redactor["s"].len(), 1);
    }

    #[test]
    fn test_invalid_selector_is_compile_error() {
        assert!(MultiLineRedactor::new("(", VALUE, "f", "bad").is_err());
        assert!(MultiLineRedactor::new(SELECTOR, "[", "f", "bad").is_err());
    }
}
