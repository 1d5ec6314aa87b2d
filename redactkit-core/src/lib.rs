// redactkit-core/src/lib.rs
//! # redactkit Core Library
//!
//! `redactkit-core` scrubs sensitive values out of diagnostic text before it
//! leaves the environment. Content is streamed line by line through an
//! ordered chain of redactors, and every redaction is recorded in a ledger
//! indexed by rule and by file. The redacted content itself never carries
//! any trace of what was removed.
//!
//! ## Modules
//!
//! * `compiler`: Compiles rule patterns, resolving the `mask` and `drop` groups.
//! * `line_reader`: Splits byte streams into lines that keep their terminators.
//! * `redactor`: The `Redactor` trait every chain stage implements.
//! * `redactors`: Single-line, multi-line, literal and YAML path redactors.
//! * `redaction`: The `Redaction` record and the `RedactionList` indices.
//! * `ledger`: The concurrency-safe, fire-and-forget redaction ledger.
//! * `builtin`: The default rule table applied to every file.
//! * `config`: Custom rules (`RuleSpec`) and the rule-file loader.
//! * `path_match`: Glob matching of file paths.
//! * `engine`: Chain assembly and the top-level `redact` entry points.
//! * `errors`: The `RedactionError` type.
//!
//! ## Usage Example
//!
//! ```rust
//! use redactkit_core::{RedactionEngine, RedactionLedger, RuleSpec};
//!
//! fn main() -> Result<(), redactkit_core::RedactionError> {
//!     let engine = RedactionEngine::new(RedactionLedger::new());
//!     let rules = vec![RuleSpec {
//!         name: Some("api-keys".to_string()),
//!         file: Some("logs/*.log".to_string()),
//!         values: vec!["sk-live-1234".to_string()],
//!         ..Default::default()
//!     }];
//!
//!     let output = engine.redact(b"key=sk-live-1234\n", "logs/app.log", &rules)?;
//!     assert_eq!(output, b"key=***HIDDEN***\n");
//!
//!     let list = engine.ledger().snapshot();
//!     assert_eq!(list.by_redactor["api-keys-0"].len(), 1);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`RedactionError`]. A custom rule that
//! cannot be built fails the whole `redact` call; a YAML document that does
//! not parse is passed through unchanged and reported in
//! [`RedactionList::warnings`].
//!
//! ---
//! License: MIT OR APACHE 2.0

pub mod builtin;
pub mod compiler;
pub mod config;
pub mod engine;
pub mod errors;
pub mod ledger;
pub mod line_reader;
pub mod path_match;
pub mod redaction;
pub mod redactor;
pub mod redactors;

/// Re-exports the entry points for redacting content.
pub use engine::{
    build_custom_redactors, get_redaction_list, redact, redactor_name, reset_redaction_list, RedactingReader,
    RedactionEngine,
};

/// Re-exports the custom rule types and the rule-file loader.
pub use config::{MultiLinePair, RedactConfig, RuleSpec};

/// Re-exports the custom error type for clear error reporting.
pub use errors::{RedactionError, Result};

pub use compiler::{compile_pattern, CompiledPattern, MASK_TEXT};
pub use ledger::{default_ledger, RedactionLedger};
pub use line_reader::{Line, LineEnding, LineReader, LineStream};
pub use redaction::{redact_sensitive, Redaction, RedactionList, RedactionWarning};
pub use redactor::Redactor;
pub use redactors::{LiteralRedactor, MultiLineRedactor, SingleLineRedactor, YamlRedactor};
