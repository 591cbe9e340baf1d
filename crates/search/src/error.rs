use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid matching configuration: {0}")]
    InvalidConfig(String),

    #[error("Empty query")]
    EmptyQuery,
}
