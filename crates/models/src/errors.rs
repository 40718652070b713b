use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("inconsistent record: {0}")]
    Inconsistent(String),
}
