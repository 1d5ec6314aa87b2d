// redactkit/src/logger.rs
//! Logger setup for the redactkit binary.
//!
//! Logs always go to stderr so they never mix with redacted output on
//! stdout.

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Initializes `env_logger`.
///
/// An explicit `level` wins over `RUST_LOG`; without one, `RUST_LOG` is
/// honoured and defaults to `warn`. Calling this more than once is harmless.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = match level {
        Some(level) => {
            let mut builder = Builder::new();
            builder.filter_level(level);
            builder
        }
        None => Builder::from_env(Env::default().default_filter_or("warn")),
    };
    builder.target(Target::Stderr).format_timestamp(None);
    let _ = builder.try_init();
}
