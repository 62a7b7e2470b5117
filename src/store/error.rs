//! Store error types
//!
//! Defines all errors a match store can report while running a pipeline.

use thiserror::Error;

/// Errors that can occur in a match store
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The store could not evaluate the composed pipeline
    #[error("Invalid pipeline: {0}")]
    InvalidPipeline(#[from] crate::pipeline::PipelineError),

    /// The backing database rejected the query or is unreachable
    #[error("Backend error: {0}")]
    Backend(String),

    /// MongoDB driver error
    #[cfg(feature = "mongodb")]
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
