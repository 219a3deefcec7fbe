//! Error types for the qube library.
//!
//! Structural problems with a cube are not errors: they are reported as
//! [`StructuralError`](crate::validation::StructuralError) findings. The
//! variants here abort the current operation.

use std::path::PathBuf;
use thiserror::Error;

use crate::identifier::ResolveError;
use crate::shape::ShapeError;

/// Main error type for qube operations.
#[derive(Debug, Error)]
pub enum QubeError {
    /// Error reading or writing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing tabular input.
    #[error("Parse error at row {row}, column {column}: {message}")]
    Parse {
        row: usize,
        column: usize,
        message: String,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file or no data to process.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A query returned the wrong number of records.
    #[error("Query '{query}' expected {expected} record(s), but found {actual}")]
    UnexpectedRecordCount {
        query: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A section the document must contain is absent.
    #[error("Document is missing a required section: {section}")]
    MissingDocumentSection { section: String },

    /// A URI template could not be interpreted.
    #[error("Malformed URI template '{template}': {reason}")]
    MalformedUriTemplate { template: String, reason: String },

    /// The document is neither a data cube nor a code list.
    #[error("Input is neither a data cube nor a code list")]
    InputNotSupported,

    /// No table with the given URL is described by the document.
    #[error("No table with url '{csv_url}' is described by the document")]
    UnknownTable { csv_url: String },

    /// The cube's shape is not one we can serialize.
    #[error("Unsupported cube shape: {0}")]
    UnsupportedShape(#[from] ShapeError),

    /// An identifier could not be resolved.
    #[error("Identifier resolution failed: {0}")]
    Resolution(#[from] ResolveError),

    /// A data value has no URI-safe mapping in a coded column.
    #[error("Column '{column}' has no mapping for value '{value}'")]
    MissingValueMapping { column: String, value: String },
}

/// Result type alias for qube operations.
pub type Result<T> = std::result::Result<T, QubeError>;

impl QubeError {
    /// Wrap an IO error together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        QubeError::Io {
            path: path.into(),
            source,
        }
    }
}
