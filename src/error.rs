//! Error handling for CSV conversion and batch storage.
//!
//! Every failure of the pipeline is returned to the immediate caller as an
//! [`Error`]. Malformed CSV is reported through [`FormatError`], which carries
//! the line, column or row indices needed to locate the problem.

use crate::app::models::BatchId;
use std::fmt;
use thiserror::Error;

/// Result type alias for csv2json operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The input contained no readable rows (including a zero-byte input)
    #[error("end of input: the CSV stream contained no rows")]
    EndOfInput,

    #[error("CSV format error: {0}")]
    Format(#[from] FormatError),

    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A query was made while running without a store
    #[error("storage is not configured")]
    StoreNotConfigured,

    #[error("batch {id} not found")]
    NotFound { id: BatchId },

    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Malformed CSV input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("bare quote in unquoted field at line {line}, column {column}")]
    BareQuote { line: usize, column: usize },

    #[error("extraneous or missing quote in quoted field at line {line}, column {column}")]
    ExtraneousQuote { line: usize, column: usize },

    #[error("unterminated quoted field starting at line {line}")]
    UnterminatedQuote { line: usize },

    #[error("invalid UTF-8 in record at line {line}")]
    InvalidUtf8 { line: usize },

    #[error("wrong number of fields: {}", MismatchList(.0))]
    ColumnCount(Vec<ColumnMismatch>),
}

/// One data row whose field count differs from the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMismatch {
    /// Record index (the header is row 0, the first data row is row 1)
    pub row: usize,
    /// Physical line the row started on
    pub line: usize,
    pub expected: usize,
    pub actual: usize,
}

impl fmt::Display for ColumnMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {} (line {}): expected {} fields, found {}",
            self.row, self.line, self.expected, self.actual
        )
    }
}

struct MismatchList<'a>(&'a [ColumnMismatch]);

impl fmt::Display for MismatchList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, mismatch) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", mismatch)?;
        }
        Ok(())
    }
}

impl FormatError {
    /// Row indices named by a column-count error, empty for other variants
    pub fn mismatched_rows(&self) -> Vec<usize> {
        match self {
            FormatError::ColumnCount(mismatches) => mismatches.iter().map(|m| m.row).collect(),
            _ => Vec::new(),
        }
    }
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a JSON error with context
    pub fn json(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            message: message.into(),
            source,
        }
    }

    /// Create a storage error without an underlying cause
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Create a storage error wrapping a backend failure
    pub fn storage_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn not_found(id: BatchId) -> Self {
        Self::NotFound { id }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether the input itself was at fault (as opposed to I/O or storage)
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::EndOfInput | Error::Format(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Json {
            message: "JSON processing failed".to_string(),
            source: error,
        }
    }
}
