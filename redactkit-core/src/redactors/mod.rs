// redactkit-core/src/redactors/mod.rs
//! Concrete implementations of the [`Redactor`](crate::redactor::Redactor) trait.
//!
//! * `single_line`: one pattern applied to every line.
//! * `multi_line`: a selector line gates a pattern on the line after it.
//! * `literal`: exact substring replacement.
//! * `yaml`: structured redaction by document path.

pub mod literal;
pub mod multi_line;
pub mod single_line;
pub mod yaml;

pub use literal::LiteralRedactor;
pub use multi_line::MultiLineRedactor;
pub use single_line::SingleLineRedactor;
pub use yaml::YamlRedactor;
