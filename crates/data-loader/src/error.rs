//! Error types for the data-loader crate.
//!
//! Only whole-table failures surface here. A single malformed row is not an
//! error: the parser drops it and keeps going.

use thiserror::Error;

/// Errors that can occur while loading one of the lookup tables
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The CSV reader failed on the file as a whole (bad header, bad encoding)
    #[error("CSV error in {file}: {source}")]
    CsvError {
        file: String,
        #[source]
        source: csv::Error,
    },

    /// A required column is absent from the header row
    #[error("Missing column '{column}' in {file}")]
    MissingColumn { file: String, column: String },
}

/// Convenience Result type for data loading
pub type Result<T> = std::result::Result<T, DataLoadError>;
