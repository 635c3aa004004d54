// In: src/error.rs

//! This module defines the single, unified error type for the entire batchex
//! library. It uses the `thiserror` crate to provide ergonomic, context-aware
//! error handling.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BatchexError>;

#[derive(Error, Debug)]
pub enum BatchexError {
    // =========================================================================
    // === High-Level, Semantic Errors (Specific to our library's logic)
    // =========================================================================
    /// Two column-map entries share a logical name. Fatal at load, before any
    /// extraction starts; silently overwriting would corrupt every batch.
    #[error("duplicate logical column name in column map: {0:?}")]
    DuplicateColumn(String),

    /// A column-map entry is malformed (zero group id, zero 1-based index, ...).
    #[error("invalid column mapping for {name:?}: {reason}")]
    InvalidMapping { name: String, reason: String },

    /// A mapped (group, index) location does not exist in a physical file, or
    /// the requested row range exceeds the file's row extent. Fatal to the
    /// file's run; substituting a default would be silent data corruption.
    #[error("cannot resolve column {column:?} in file {file:?}: {reason}")]
    ColumnResolution {
        column: String,
        file: String,
        reason: String,
    },

    /// A physical read returned a slice whose length does not match the
    /// requested row range.
    #[error("store returned {actual} rows for {column:?}, expected {expected}")]
    ShapeMismatch {
        column: String,
        expected: u64,
        actual: u64,
    },

    /// A tunable run parameter is out of its valid domain.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A packed container file is malformed or has an unsupported version.
    #[error("packed store format error: {0}")]
    StoreFormat(String),

    /// A physical handle could not be released. Reported, but does not
    /// invalidate reports already collected for the file.
    #[error("failed to release handle for file {file:?}: {reason}")]
    ResourceRelease { file: String, reason: String },

    #[error("internal logic error (this is a bug): {0}")]
    Internal(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the Arrow library (Columnar record layout).
    #[error("Arrow operation failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// An error originating from the underlying I/O subsystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically while loading the
    /// column map or writing a run report.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}
