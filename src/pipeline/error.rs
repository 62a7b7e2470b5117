//! Pipeline error types
//!
//! Errors raised while composing a pipeline or evaluating one in memory.

use thiserror::Error;

/// Errors that can occur while building or evaluating a pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// The player identifier was empty
    #[error("Player identifier must not be empty")]
    EmptyPlayerId,

    /// A query tried to redefine `count`, `wins` or `losses`
    #[error("Accumulator name is reserved: {0}")]
    ReservedAccumulator(String),

    /// Two accumulators share an output name
    #[error("Duplicate accumulator: {0}")]
    DuplicateAccumulator(String),

    /// A stage was placed in a phase that cannot hold it
    #[error("Stage {stage} is not allowed in the {phase} phase")]
    MisplacedStage {
        stage: &'static str,
        phase: &'static str,
    },

    /// An expression could not be evaluated against a document
    #[error("Evaluation error: {0}")]
    Evaluation(String),
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::ReservedAccumulator("wins".to_string());
        assert_eq!(err.to_string(), "Accumulator name is reserved: wins");

        let err = PipelineError::MisplacedStage {
            stage: "$group",
            phase: "final",
        };
        assert_eq!(
            err.to_string(),
            "Stage $group is not allowed in the final phase"
        );
    }
}
