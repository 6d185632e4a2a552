//! Error types for every stage of a fixed-width parse.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::decode::DecodeError;

pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid schema: {message}")]
    InvalidSchema { message: String },

    #[error("Invalid parser configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Cannot open source '{}': {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed record at line {line}: expected {expected} bytes, found {found}")]
    MalformedRecord {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Line {line} does not end with the expected {expected} terminator")]
    TerminatorMismatch { line: u64, expected: &'static str },

    #[error("Record buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    #[error("Line {line}: {source}")]
    Decode {
        line: u64,
        #[source]
        source: DecodeError,
    },

    #[error("Running total overflowed i64 at line {line}")]
    TotalOverflow { line: u64 },

    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: i64, actual: i64 },

    #[error("I/O error after line {line}: {source}")]
    Io {
        line: u64,
        #[source]
        source: io::Error,
    },
}

impl ParseError {
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            message: message.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    pub fn malformed(line: u64, expected: usize, found: usize) -> Self {
        Self::MalformedRecord {
            line,
            expected,
            found,
        }
    }

    pub fn buffer_too_small(needed: usize, available: usize) -> Self {
        Self::BufferTooSmall { needed, available }
    }

    /// Line number the error refers to, when it is tied to one.
    pub fn line(&self) -> Option<u64> {
        match self {
            Self::MalformedRecord { line, .. }
            | Self::TerminatorMismatch { line, .. }
            | Self::Decode { line, .. }
            | Self::TotalOverflow { line }
            | Self::Io { line, .. } => Some(*line),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display() {
        let err = ParseError::malformed(7, 165, 12);
        assert_eq!(
            err.to_string(),
            "Malformed record at line 7: expected 165 bytes, found 12"
        );
        assert_eq!(err.line(), Some(7));
    }

    #[test]
    fn test_decode_error_carries_line() {
        let err = ParseError::Decode {
            line: 3,
            source: DecodeError::EmptyColumn { column: 4 },
        };
        assert_eq!(err.line(), Some(3));
        assert!(err.to_string().starts_with("Line 3: "));
        assert!(err.to_string().contains("column 4"));
    }

    #[test]
    fn test_schema_error_has_no_line() {
        let err = ParseError::invalid_schema("empty");
        assert_eq!(err.line(), None);
    }
}
