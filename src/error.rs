use thiserror::Error;

/// Errors raised while building or combining vectors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VectorError {
    /// The input matched none of the recognised vector shapes.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An operation that needs an operand was called without one.
    #[error("{0} called with no argument")]
    MissingArgument(&'static str),
}

pub type Result<T> = std::result::Result<T, VectorError>;
