//! Error types for the entire library.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.
//!
//! Ambiguous trace ownership is deliberately absent here: metadata lookups
//! degrade to the "unknown" sentinel instead of failing.

use thiserror::Error;

/// Errors that can occur while decoding a persisted document
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid trace format: {0}")]
    InvalidFormat(String),

    #[error("Cannot construct unregistered type {module}.{class}")]
    UnknownType { class: String, module: String },

    #[error("Invalid attributes for {class}: {reason}")]
    InvalidAttribute { class: String, reason: String },

    #[error("Unsupported format version: {0}")]
    UnsupportedVersion(String),
}

/// Errors that can occur while encoding values
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Reference cycle through {module}.{class} cannot be encoded")]
    Cycle { class: String, module: String },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by segmentation requests
#[derive(Error, Debug)]
pub enum SegmentError {
    #[error("Ambiguous {operation}: {reason}")]
    AmbiguousOperation {
        operation: &'static str,
        reason: String,
    },
}

/// Errors from the transient cluster assignment
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ClusterError {
    #[error("Traces are not clustered, call create_clusters() first")]
    NotClustered,

    #[error("Expected {expected} cluster labels, found {found}")]
    LengthMismatch { expected: usize, found: usize },
}

/// Errors that can occur during file input/output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("Failed to read file: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}
