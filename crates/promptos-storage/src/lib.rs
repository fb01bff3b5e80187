//! PromptOS storage crate - SQLite prompt log.
//!
//! Records every executed prompt with its result in a versioned SQLite
//! schema and reads the latest entries back.

pub mod migrations;
pub mod prompt_log;

pub use prompt_log::{PromptLog, PromptLogEntry};
