//! Core domain models for the chat feed.

use serde::{Deserialize, Serialize};

use super::value_object::{MessageId, MessageText, UserName};

/// Reference from a message to the earlier message it replies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyRef {
    /// Replied-to message
    pub target: MessageId,
    /// Excerpt of the replied-to message shown next to the reply
    pub snippet: String,
}

/// Reply being composed: at most one per compose session
pub type ReplyContext = ReplyRef;

/// Per-emoji reaction counts of a message, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reactions(Vec<(String, u32)>);

impl Reactions {
    /// Create an empty reaction summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole summary with the server's authoritative counts.
    ///
    /// Emojis already shown keep their position; new ones are appended.
    pub fn replace_with<I>(&mut self, counts: I)
    where
        I: IntoIterator<Item = (String, u32)>,
    {
        let incoming: Vec<(String, u32)> = counts.into_iter().filter(|(_, n)| *n > 0).collect();
        self.0.retain(|(emoji, _)| incoming.iter().any(|(e, _)| e == emoji));
        for (emoji, count) in incoming {
            match self.0.iter_mut().find(|(e, _)| *e == emoji) {
                Some(existing) => existing.1 = count,
                None => self.0.push((emoji, count)),
            }
        }
    }

    /// Count for `emoji`, zero when absent
    pub fn count(&self, emoji: &str) -> u32 {
        self.0
            .iter()
            .find(|(e, _)| e == emoji)
            .map_or(0, |(_, n)| *n)
    }

    /// Iterate over (emoji, count) pairs in display order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(e, n)| (e.as_str(), *n))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Represents a chat message as delivered by the server
///
/// Only `text` (edits) and `read_by` (append-only, unique) change after delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Server-assigned identifier
    pub id: MessageId,
    /// Author's display name
    pub author: UserName,
    /// Text body; may be absent when an image is attached
    pub text: Option<MessageText>,
    /// Image payload (data URI or URL)
    pub image: Option<String>,
    /// Message this one replies to
    pub reply_to: Option<ReplyRef>,
    /// Readers in the order they acknowledged the message
    pub read_by: Vec<UserName>,
    /// Reaction counts
    pub reactions: Reactions,
}

impl Message {
    /// Create a message with no body, image, reply or readers
    pub fn new(id: MessageId, author: UserName) -> Self {
        Self {
            id,
            author,
            text: None,
            image: None,
            reply_to: None,
            read_by: Vec::new(),
            reactions: Reactions::new(),
        }
    }

    /// Builder-style setter for the text body
    pub fn with_text(mut self, text: MessageText) -> Self {
        self.text = Some(text);
        self
    }

    /// Builder-style setter for the image payload
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Builder-style setter for the reply reference
    pub fn with_reply_to(mut self, reply_to: ReplyRef) -> Self {
        self.reply_to = Some(reply_to);
        self
    }

    /// Whether `user` wrote this message
    pub fn is_authored_by(&self, user: &UserName) -> bool {
        &self.author == user
    }

    /// Whether `user` is listed as a reader
    pub fn is_read_by(&self, user: &UserName) -> bool {
        self.read_by.contains(user)
    }

    /// Whether someone other than the author and `current_user` has read this message
    pub fn is_read_by_other_than(&self, current_user: &UserName) -> bool {
        self.read_by
            .iter()
            .any(|reader| reader != current_user && reader != &self.author)
    }

    /// Record `reader` as having read this message.
    ///
    /// Returns `false` if the reader was already recorded.
    pub fn add_reader(&mut self, reader: UserName) -> bool {
        if self.read_by.contains(&reader) {
            return false;
        }
        self.read_by.push(reader);
        true
    }

    /// Text used when quoting this message in a reply or notification
    pub fn snippet(&self) -> String {
        match (&self.text, &self.image) {
            (Some(text), _) => text.as_str().to_string(),
            (None, Some(_)) => "Sent an image".to_string(),
            (None, None) => String::new(),
        }
    }
}

/// Room member as listed by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub username: UserName,
    pub online: bool,
    pub is_friend: bool,
}
