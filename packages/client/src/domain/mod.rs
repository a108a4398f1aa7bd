//! Domain layer for the chat room client.
//!
//! This module contains the feed-level rules (who typed, what is unread,
//! where the next page starts) independent of the wire format and the terminal.

pub mod entity;
pub mod error;
pub mod pagination;
pub mod repository;
pub mod typing;
pub mod unread;
pub mod value_object;

pub use entity::{Message, Reactions, ReplyContext, ReplyRef, RosterEntry};
pub use error::{RepositoryError, ValueObjectError};
pub use pagination::PaginationCursor;
pub use repository::{NotificationPermission, UiState, UiStateRepository};
pub use typing::TypingSet;
pub use unread::{ReadLedger, ReadState};
pub use value_object::{MessageId, MessageText, Timestamp, UserName};
