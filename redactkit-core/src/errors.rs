//! errors.rs - Error types for the redactkit-core library.
//!
//! Every fallible operation in the library returns [`RedactionError`]. The
//! variants map onto the three failure classes of the pipeline: rules that
//! cannot be built, streams that fail mid-drain, and structured content that
//! cannot be parsed.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RedactionError>;

/// All error types produced by `redactkit-core`.
///
/// Marked `#[non_exhaustive]` so new variants can be added without breaking
/// downstream matches.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RedactionError {
    #[error("failed to compile pattern {pattern:?}: {source}")]
    Compile {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid redaction rule '{rule}': {reason}")]
    InvalidRule { rule: String, reason: String },

    #[error("invalid file glob {pattern:?}: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to read input while redacting: {0}")]
    Read(#[from] std::io::Error),

    #[error("could not parse '{file}' as YAML: {reason}")]
    StructuralParse { file: String, reason: String },

    #[error("redaction config error: {0}")]
    Config(String),
}

impl RedactionError {
    /// Shorthand for [`RedactionError::InvalidRule`].
    pub fn invalid_rule(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        RedactionError::InvalidRule {
            rule: rule.into(),
            reason: reason.into(),
        }
    }
}
