use thiserror::Error;

#[derive(Error, Debug)]
pub enum SweeperError {
    #[error("Unknown session token: {0}")]
    InvalidSession(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Session does not belong to owner: {0}")]
    Forbidden(String),

    #[error("Unknown owner: {0}")]
    UnknownOwner(String),
}

pub type Result<T> = std::result::Result<T, SweeperError>;
