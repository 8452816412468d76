//! Error types for the translator crate.

use thiserror::Error;

/// Errors that can occur while translating a statement.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// SQL parsing failed.
    #[error("failed to parse SQL: {0}")]
    Parse(String),

    /// The input contained no statement.
    #[error("no SQL statement to translate")]
    EmptyStatement,
}
