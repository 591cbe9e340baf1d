use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, LearningError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LearningError {
    #[error("Strategic path not found: {0}")]
    PathNotFound(String),

    #[error("Recalculation already in progress for path {0}")]
    AlreadyProcessing(String),

    #[error("Invalid job transition from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("Invalid outcome {outcome_id}: {reason}")]
    InvalidOutcome { outcome_id: String, reason: String },

    #[error("Stale aggregate write for path {path_id}: expected model version {expected}, found {actual}")]
    StaleWrite {
        path_id: String,
        expected: u32,
        actual: u32,
    },

    #[error("Recalculation job not found: {0}")]
    JobNotFound(Uuid),

    #[error("timeout")]
    Timeout,

    #[error("Invalid learning config: {0}")]
    InvalidConfig(String),

    #[error("Invalid strategic path {path_id}: {reason}")]
    InvalidPath { path_id: String, reason: String },
}
