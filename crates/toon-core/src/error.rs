//! The error type decoding can fail with.
//!
//! Encoding never fails: every `Value` is already in the supported domain by construction,
//! and non-finite floats normalise to `null` rather than erroring (see `encoder.rs`).

use thiserror::Error;

/// A TOON document failed to decode.
///
/// The single `Decode` variant covers every row of the crate's error table (indent
/// granularity, missing colon, count mismatch, tabular width mismatch, list-item prefix,
/// blank line inside array, string escape, path-expansion conflict) — they differ only in
/// `message`, not in kind, so one variant carries all of them rather than one enum case per
/// row.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToonError {
    /// `line` is the 1-based source line the error was detected at, or `0` when no single
    /// line is responsible (e.g. an array-count mismatch only visible once the whole body
    /// is read).
    #[error("TOON decode error at line {line}: {message}")]
    Decode { line: usize, message: String },
}

impl ToonError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        ToonError::Decode {
            line,
            message: message.into(),
        }
    }

    /// The line the error was detected at.
    pub fn line(&self) -> usize {
        match self {
            ToonError::Decode { line, .. } => *line,
        }
    }

    /// The human-readable message, without the `line` prefix.
    pub fn message(&self) -> &str {
        match self {
            ToonError::Decode { message, .. } => message,
        }
    }
}

pub type Result<T> = std::result::Result<T, ToonError>;
