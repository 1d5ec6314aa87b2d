// redactkit/src/lib.rs
//! # redactkit CLI
//!
//! The command-line front end of `redactkit-core`: redacts files, directory
//! trees and stdin, writes JSON reports of the redactions performed, and
//! prints a summary table.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;
