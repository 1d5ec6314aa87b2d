// redactkit-core/src/redactors/literal.rs
//! A `Redactor` that masks every occurrence of one exact string.
//! License: MIT OR APACHE 2.0

use regex::bytes::Regex;
use std::sync::Arc;

use crate::compiler::MASK_TEXT;
use crate::errors::{RedactionError, Result};
use crate::ledger::RedactionLedger;
use crate::line_reader::LineStream;
use crate::redaction::{log_redaction_trace, Redaction};
use crate::redactor::Redactor;

#[derive(Debug)]
pub struct LiteralRedactor {
    /// `None` for an empty literal, which never matches.
    matcher: Option<Arc<Regex>>,
    name: String,
    file: String,
}

impl LiteralRedactor {
    pub fn new(value: &str, file: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let matcher = if value.is_empty() {
            None
        } else {
            let regex = Regex::new(&regex::escape(value)).map_err(|source| RedactionError::Compile {
                pattern: value.to_string(),
                source,
            })?;
            Some(Arc::new(regex))
        };
        Ok(Self {
            matcher,
            name: name.into(),
            file: file.into(),
        })
    }
}

impl Redactor for LiteralRedactor {
    fn name(&self) -> &str {
        &self.name
    }

    fn file(&self) -> &str {
        &self.file
    }

    fn redact<'a>(&self, input: LineStream<'a>, ledger: &RedactionLedger) -> LineStream<'a> {
        let Some(matcher) = self.matcher.clone() else {
            return input;
        };
        let name = self.name.clone();
        let file = self.file.clone();
        let ledger = ledger.clone();
        let mut line_number = 0usize;

        Box::new(input.map(move |line| {
            let mut line = line?;
            line_number += 1;

            let mut output = Vec::with_capacity(line.content.len());
            let mut cursor = 0usize;
            let mut removed = 0usize;
            for m in matcher.find_iter(&line.content) {
                output.extend_from_slice(&line.content[cursor..m.start()]);
                output.extend_from_slice(MASK_TEXT.as_bytes());
                removed += m.len();
                cursor = m.end();
            }

            if removed > 0 {
                output.extend_from_slice(&line.content[cursor..]);
                let redaction = Redaction {
                    redactor_name: name.clone(),
                    characters_removed: removed,
                    line: line_number,
                    file: file.clone(),
                };
                log_redaction_trace(&redaction, &line.content);
                ledger.record(redaction);
                line.content = output;
            }
            Ok(line)
        }))
    }
}
