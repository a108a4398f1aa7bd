//! Output ports of the feed controller.
//!
//! The controller only talks to the outside world through these traits;
//! infrastructure provides the WebSocket and terminal implementations.

use crate::domain::{MessageId, MessageText, NotificationPermission, ReplyContext};

/// Intent sent from this client to the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// `message`: a new chat message
    SendMessage {
        text: String,
        image: Option<String>,
        reply_to: Option<ReplyContext>,
    },
    /// `typing`: the local user started or stopped typing
    Typing { is_typing: bool },
    /// `mark_messages_read`: read-acknowledgement for a batch of ids
    MarkMessagesRead { message_ids: Vec<MessageId> },
    /// `edit_message`
    EditMessage {
        message_id: MessageId,
        new_text: MessageText,
    },
    /// `delete_message`
    DeleteMessage { message_id: MessageId },
    /// `add_reaction`
    AddReaction { message_id: MessageId, emoji: String },
    /// `load_more_messages`: request the page older than `last_message_id`
    LoadMoreMessages { last_message_id: MessageId },
}

impl ClientEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::SendMessage { .. } => "message",
            ClientEvent::Typing { .. } => "typing",
            ClientEvent::MarkMessagesRead { .. } => "mark_messages_read",
            ClientEvent::EditMessage { .. } => "edit_message",
            ClientEvent::DeleteMessage { .. } => "delete_message",
            ClientEvent::AddReaction { .. } => "add_reaction",
            ClientEvent::LoadMoreMessages { .. } => "load_more_messages",
        }
    }
}

/// Bidirectional realtime transport, outgoing half.
///
/// Emission is fire-and-forget: no delivery guarantee and no response
/// correlation. Replies arrive later as independent server events.
#[cfg_attr(test, mockall::automock)]
pub trait RealtimeChannel: Send + Sync {
    fn emit(&self, event: ClientEvent);
}

/// Handle of a shown desktop notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationId(pub u64);

/// Desktop notification content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopNotification {
    pub title: String,
    pub body: String,
    pub icon: String,
}

/// Icon shown with every notification
pub const NOTIFICATION_ICON: &str = "/static/images/chat-icon.png";

/// User-facing surfaces outside the feed: notifications and blocking alerts
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send {
    /// Ask the user for notification permission and return the answer
    fn request_permission(&mut self) -> NotificationPermission;

    /// Show a notification
    fn show(&mut self, notification: &DesktopNotification) -> NotificationId;

    /// Close a notification; closing an already closed one is a no-op
    fn dismiss(&mut self, id: NotificationId);

    /// Blocking alert the user has to acknowledge
    fn alert(&mut self, message: &str);
}
