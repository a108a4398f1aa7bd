//! MessageRenderer: turns a message into a render tree.
//!
//! Pure and idempotent. Wiring the affordances to operations is up to the caller.

use crate::domain::{Message, MessageId, UserName};

/// Avatar image used when a profile photo cannot be loaded
pub const DEFAULT_AVATAR: &str = "/static/images/default-profile.png";

/// Body shown for messages that only carry an image
pub const IMAGE_ONLY_BODY: &str = "Sent an image";

/// Visual style of the message bubble
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleStyle {
    /// Written by the current user
    Own,
    /// Written by someone else
    Other,
}

/// Action offered on a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageAction {
    Reply,
    Edit,
    Delete,
}

impl MessageAction {
    pub fn label(&self) -> &'static str {
        match self {
            MessageAction::Reply => "reply",
            MessageAction::Edit => "edit",
            MessageAction::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Avatar {
    pub src: String,
    pub fallback: &'static str,
    pub alt: String,
}

/// Clickable excerpt of the replied-to message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyAffordance {
    pub target: MessageId,
    pub snippet: String,
}

/// Render tree of one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub id: MessageId,
    pub author: UserName,
    /// Absent for own messages
    pub avatar: Option<Avatar>,
    pub bubble: BubbleStyle,
    pub body: String,
    pub image: Option<String>,
    pub reply: Option<ReplyAffordance>,
    pub actions: Vec<MessageAction>,
}

impl RenderedMessage {
    pub fn is_own(&self) -> bool {
        self.bubble == BubbleStyle::Own
    }
}

/// Render `message` as seen by `current_user`
pub fn render_message(message: &Message, current_user: &UserName) -> RenderedMessage {
    let is_own = message.is_authored_by(current_user);

    let avatar = (!is_own).then(|| Avatar {
        src: format!("/profile_photos/{}", message.author),
        fallback: DEFAULT_AVATAR,
        alt: format!("{}'s profile", message.author),
    });

    let body = match (&message.text, &message.image) {
        (Some(text), _) => text.as_str().to_string(),
        (None, Some(_)) => IMAGE_ONLY_BODY.to_string(),
        (None, None) => String::new(),
    };

    let reply = message.reply_to.as_ref().map(|r| ReplyAffordance {
        target: r.target.clone(),
        snippet: r.snippet.clone(),
    });

    let actions = if is_own {
        vec![MessageAction::Reply, MessageAction::Edit, MessageAction::Delete]
    } else {
        vec![MessageAction::Reply]
    };

    RenderedMessage {
        id: message.id.clone(),
        author: message.author.clone(),
        avatar,
        bubble: if is_own {
            BubbleStyle::Own
        } else {
            BubbleStyle::Other
        },
        body,
        image: message.image.clone(),
        reply,
        actions,
    }
}
