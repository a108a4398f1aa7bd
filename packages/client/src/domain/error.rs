//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// MessageId validation error
    #[error("MessageId cannot be empty")]
    MessageIdEmpty,

    /// MessageId too long error
    #[error("MessageId cannot exceed {max} characters (got {actual})")]
    MessageIdTooLong { max: usize, actual: usize },

    /// UserName validation error
    #[error("UserName cannot be empty")]
    UserNameEmpty,

    /// UserName too long error
    #[error("UserName cannot exceed {max} characters (got {actual})")]
    UserNameTooLong { max: usize, actual: usize },

    /// MessageText validation error (empty after trimming)
    #[error("MessageText cannot be empty")]
    MessageTextEmpty,

    /// MessageText too long error
    #[error("MessageText cannot exceed {max} characters (got {actual})")]
    MessageTextTooLong { max: usize, actual: usize },
}

/// Errors raised by UI state repositories
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Reading or writing the backing store failed
    #[error("UI state storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The stored document could not be (de)serialized
    #[error("UI state document is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}
