use std::fmt::{Display, Formatter};
use thiserror::Error;

use crate::normalization::NormMethod;

/// Position of a malformed token inside a serialized dataset or model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// 1-based line and column in a text payload.
    Line { line: usize, column: usize },
    /// Byte offset in a binary payload.
    Byte(usize),
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Line { line, column } => write!(f, "line {line}, column {column}"),
            Location::Byte(offset) => write!(f, "byte offset {offset}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EsvmError {
    #[error("training failed: {0}")]
    Training(String),

    #[error("parse error at {location}: {reason}")]
    Parse { location: Location, reason: String },

    #[error("illegal state: {0}")]
    IllegalState(String),

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("degenerate {method} range: ({first}, {second})")]
    DegenerateRange {
        method: NormMethod,
        first: f64,
        second: f64,
    },

    #[error("index {index} out of range for length {len}")]
    Index { index: usize, len: usize },

    #[error("empty population: {0}")]
    EmptyPopulation(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl EsvmError {
    pub(crate) fn parse_at_line(line: usize, column: usize, reason: impl Into<String>) -> Self {
        EsvmError::Parse {
            location: Location::Line { line, column },
            reason: reason.into(),
        }
    }

    pub(crate) fn parse_at_byte(offset: usize, reason: impl Into<String>) -> Self {
        EsvmError::Parse {
            location: Location::Byte(offset),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EsvmError>;
