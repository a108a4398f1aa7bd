//! Crate-level error type returned by the client entry points.

use thiserror::Error;

use crate::{
    domain::ValueObjectError,
    infrastructure::{ChannelError, DtoError},
};

/// Errors that end a client run
#[derive(Debug, Error)]
pub enum ClientError {
    /// The session user name is not valid
    #[error("Invalid user name: {0}")]
    InvalidUsername(#[from] ValueObjectError),

    /// The realtime connection could not be opened
    #[error("Failed to connect: {0}")]
    Channel(#[from] ChannelError),

    /// A push payload could not be decoded
    #[error(transparent)]
    Payload(#[from] DtoError),

    /// The line editor could not be started
    #[error("Terminal input error: {0}")]
    Input(#[from] rustyline::error::ReadlineError),
}
