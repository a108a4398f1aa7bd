//! Infrastructure layer error definitions.

use thiserror::Error;

/// Errors raised while decoding or encoding wire payloads
#[derive(Debug, Error)]
pub enum DtoError {
    /// The server sent an event this client does not handle
    #[error("Unknown server event '{0}'")]
    UnknownEvent(String),

    /// The payload of a known event did not match its shape
    #[error("Malformed '{event}' payload: {source}")]
    Malformed {
        event: String,
        #[source]
        source: serde_json::Error,
    },

    /// The Engine.IO / Socket.IO frame itself could not be parsed
    #[error("Malformed frame: {0}")]
    Frame(String),

    /// An outgoing payload could not be serialized
    #[error("Failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors raised by the realtime channel
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Opening the WebSocket failed
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}
