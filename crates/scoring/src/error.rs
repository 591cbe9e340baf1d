use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScoringError>;

#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("Strategic path not found: {0}")]
    PathNotFound(String),

    #[error("Invalid scoring profile: {0}")]
    InvalidProfile(String),
}
