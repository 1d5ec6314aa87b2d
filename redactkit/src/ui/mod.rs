// redactkit/src/ui/mod.rs
//! Terminal output helpers.

pub mod redaction_summary;
