//! UseCase layer error definitions.

use thiserror::Error;

use crate::domain::{MessageId, ValueObjectError};

/// Errors of user-initiated feed operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComposeError {
    /// Nothing to send: empty text and no image
    #[error("Nothing to send")]
    NothingToSend,

    /// The message is not in the loaded feed
    #[error("Message '{0}' is not loaded")]
    UnknownMessage(MessageId),

    /// Only the author may edit or delete a message
    #[error("Message '{0}' was written by someone else")]
    NotAuthor(MessageId),

    /// The edit does not change the text
    #[error("Message '{0}' already has this text")]
    Unchanged(MessageId),

    /// No delete is waiting for confirmation
    #[error("No delete is waiting for confirmation")]
    NoPendingDelete,

    /// Invalid input
    #[error(transparent)]
    Invalid(#[from] ValueObjectError),
}
