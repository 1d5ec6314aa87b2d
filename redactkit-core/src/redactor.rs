// redactkit-core/src/redactor.rs
//! Defines the `Redactor` trait shared by every redaction stage.
//!
//! A redactor wraps the line stream produced by the previous stage and
//! returns a new stream. Nothing runs until the outermost stream is pulled,
//! so a chain of N redactors processes the input line by line in a single
//! pass.
//!
//! License: MIT OR APACHE 2.0

use crate::ledger::RedactionLedger;
use crate::line_reader::LineStream;

/// One stage of a redaction chain.
pub trait Redactor: Send + Sync {
    /// Name recorded in the ledger for every redaction this stage performs.
    fn name(&self) -> &str;

    /// The file path this redactor was built for.
    fn file(&self) -> &str;

    /// Wraps `input` in a stream that redacts it lazily.
    ///
    /// The returned stream owns everything it needs apart from `input`, and
    /// reports each redaction to `ledger` without waiting for it to be
    /// stored.
    fn redact<'a>(&self, input: LineStream<'a>, ledger: &RedactionLedger) -> LineStream<'a>;
}
