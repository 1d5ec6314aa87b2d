// redactkit-core/src/redactors/single_line.rs
//! A `Redactor` that applies one compiled pattern to each line independently.
//! License: MIT OR APACHE 2.0

use std::sync::Arc;

use crate::compiler::{compile_pattern, CompiledPattern};
use crate::errors::Result;
use crate::ledger::RedactionLedger;
use crate::line_reader::LineStream;
use crate::redaction::{log_redaction_trace, Redaction};
use crate::redactor::Redactor;

#[derive(Debug)]
pub struct SingleLineRedactor {
    pattern: Arc<CompiledPattern>,
    name: String,
    file: String,
}

impl SingleLineRedactor {
    pub fn new(pattern: &str, file: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        Ok(Self::with_pattern(Arc::new(compile_pattern(pattern)?), file, name))
    }

    /// Builds a redactor around an already compiled, shared pattern.
    pub fn with_pattern(pattern: Arc<CompiledPattern>, file: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            pattern,
            name: name.into(),
            file: file.into(),
        }
    }
}

impl Redactor for SingleLineRedactor {
    fn name(&self) -> &str {
        &self.name
    }

    fn file(&self) -> &str {
        &self.file
    }

    fn redact<'a>(&self, input: LineStream<'a>, ledger: &RedactionLedger) -> LineStream<'a> {
        let pattern = Arc::clone(&self.pattern);
        let name = self.name.clone();
        let file = self.file.clone();
        let ledger = ledger.clone();
        let mut line_number = 0usize;

        Box::new(input.map(move |line| {
            let mut line = line?;
            line_number += 1;

            if let Some(replacement) = pattern.replace(&line.content) {
                let redaction = Redaction {
                    redactor_name: name.clone(),
                    characters_removed: replacement.characters_removed,
                    line: line_number,
                    file: file.clone(),
                };
                log_redaction_trace(&redaction, &line.content);
                ledger.record(redaction);
                line.content = replacement.output;
            }
            Ok(line)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redactors::test_support::run;

    #[test]
    fn test_redacts_matching_lines_only() {
        let redactor = SingleLineRedactor::new(r"(?i)(password *= *)(?P<mask>[^;]+)(;)", "app.conf", "pw").unwrap();
        let (out, list) = run(
            &redactor,
            "Server=db;Password=hunter2;\nnothing here\npassword = letmein;\n",
        );
        assert_eq!(
            out,
            "Server=db;Password=***HIDDEN***;\nnothing here\npassword = ***HIDDEN***;\n"
        );
        let records = &list.by_redactor["pw"];
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line, 1);
        assert_eq!(records[0].characters_removed, 7);
        assert_eq!(records[1].line, 3);
        assert_eq!(records[1].file, "app.conf");
    }

    #[test]
    fn test_one_record_per_line_with_several_matches() {
        let redactor = SingleLineRedactor::new(r"(key=)(?P<mask>\w+)", "f", "keys").unwrap();
        let (out, list) = run(&redactor, "key=a key=bb\n");
        assert_eq!(out, "key=***HIDDEN*** key=***HIDDEN***\n");
        assert_eq!(list.by_redactor["keys"].len(), 1);
        assert_eq!(list.by_redactor["keys"][0].characters_removed, 3);
    }

    #[test]
    fn test_preserves_crlf_and_missing_final_newline() {
        let redactor = SingleLineRedactor::new(r"(t=)(?P<mask>\d+)", "f", "t").unwrap();
        let (out, _) = run(&redactor, "t=1\r\nplain\r\nt=2");
        assert_eq!(out, "t=***HIDDEN***\r\nplain\r\nt=***HIDDEN***");
    }

    #[test]
    fn test_rerun_on_redacted_output_is_stable() {
        let redactor = SingleLineRedactor::new(r"(t=)(?P<mask>\S+)", "f", "t").unwrap();
        let (once, _) = run(&redactor, "t=secret\n");
        let (twice, _) = run(&redactor, &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_invalid_pattern_fails_construction() {
        assert!(SingleLineRedactor::new(r"([a-", "f", "bad").is_err());
    }
}
