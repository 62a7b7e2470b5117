//! Statistics error types
//!
//! Errors surfaced to callers of the named statistics operations. Store
//! failures are passed through unchanged, tagged with the operation that
//! issued the query.

use crate::pipeline::PipelineError;
use crate::stats::Operation;
use crate::store::StoreError;
use thiserror::Error;

/// Errors that can occur while running a statistics query
#[derive(Error, Debug)]
pub enum StatsError {
    /// Caller input was rejected before any pipeline was built
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The store rejected or failed to execute the composed pipeline
    #[error("{operation} query failed: {source}")]
    Query {
        operation: Operation,
        #[source]
        source: StoreError,
    },

    /// The store returned a document without the mandatory counters
    #[error("{operation} returned an unexpected document: {source}")]
    Decode {
        operation: Operation,
        #[source]
        source: serde_json::Error,
    },
}

impl From<PipelineError> for StatsError {
    fn from(err: PipelineError) -> Self {
        StatsError::InvalidArgument(err.to_string())
    }
}

/// Result type for statistics operations
pub type StatsResult<T> = Result<T, StatsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_operation() {
        let err = StatsError::Query {
            operation: Operation::Mates,
            source: StoreError::Backend("timeout".to_string()),
        };
        assert_eq!(err.to_string(), "mates query failed: Backend error: timeout");
    }

    #[test]
    fn test_pipeline_error_is_invalid_argument() {
        let err: StatsError = PipelineError::EmptyPlayerId.into();
        assert!(matches!(err, StatsError::InvalidArgument(_)));
        assert_eq!(
            err.to_string(),
            "Invalid argument: Player identifier must not be empty"
        );
    }
}
