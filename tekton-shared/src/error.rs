//! Error types for the Tekton pipeline explorer

use crate::types::ResourceKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TektonError>;

#[derive(Error, Debug)]
pub enum TektonError {
    #[error("CLI error: {0}")]
    Cli(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Watch error: {0}")]
    Watch(String),

    /// Raised by the command resolver when a selection level has nothing to offer.
    #[error("You need at least one {kind} available. Please create new Tekton {kind} and try again.")]
    NoCandidates { kind: ResourceKind },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_candidates_message() {
        let err = TektonError::NoCandidates {
            kind: ResourceKind::Pipeline,
        };
        assert_eq!(
            err.to_string(),
            "You need at least one Pipeline available. Please create new Tekton Pipeline and try again."
        );

        let err = TektonError::NoCandidates {
            kind: ResourceKind::PipelineRun,
        };
        assert_eq!(
            err.to_string(),
            "You need at least one PipelineRun available. Please create new Tekton PipelineRun and try again."
        );
    }
}
