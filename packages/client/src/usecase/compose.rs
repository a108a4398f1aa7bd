//! UseCase: 送信・編集・削除などユーザー操作の処理
//!
//! Nothing here renders locally: the feed only changes once the server
//! broadcasts the result back.

use crate::domain::{MessageId, MessageText, ReplyContext, Timestamp, ValueObjectError};

use super::{error::ComposeError, feed_controller::ChatFeedController, port::ClientEvent};

/// Body sent with image-only messages
const IMAGE_ONLY_TEXT: &str = "Sent an image";

impl ChatFeedController {
    /// Send a new message with the current reply context.
    ///
    /// The reply context and the draft stay until the server echoes the message back.
    pub fn compose_and_send(
        &mut self,
        text: &str,
        image: Option<String>,
    ) -> Result<(), ComposeError> {
        let text = match (MessageText::new(text), &image) {
            (Ok(text), _) => text.into_string(),
            (Err(ValueObjectError::MessageTextEmpty), Some(_)) => {
                IMAGE_ONLY_TEXT.to_string()
            }
            (Err(ValueObjectError::MessageTextEmpty), None) => {
                return Err(ComposeError::NothingToSend);
            }
            (Err(e), _) => return Err(e.into()),
        };

        self.channel.emit(ClientEvent::SendMessage {
            text: text.clone(),
            image,
            reply_to: self.reply.clone(),
        });
        self.draft = Some(text);
        Ok(())
    }

    /// Start replying to a rendered message
    pub fn start_reply(&mut self, id: &MessageId) -> Result<&ReplyContext, ComposeError> {
        let entry = self
            .feed
            .get(id)
            .ok_or_else(|| ComposeError::UnknownMessage(id.clone()))?;
        let context = ReplyContext {
            target: id.clone(),
            snippet: entry.snippet(),
        };
        let context = self.reply.insert(context);
        Ok(&*context)
    }

    /// Drop the reply context
    pub fn cancel_reply(&mut self) {
        self.reply = None;
    }

    /// Ask the server to change the text of one of our messages.
    pub fn request_edit(&mut self, id: &MessageId, new_text: &str) -> Result<(), ComposeError> {
        let entry = self
            .feed
            .get(id)
            .ok_or_else(|| ComposeError::UnknownMessage(id.clone()))?;
        if entry.author() != &self.current_user {
            return Err(ComposeError::NotAuthor(id.clone()));
        }
        let new_text = MessageText::new(new_text)?;
        if entry.text.as_ref() == Some(&new_text) {
            return Err(ComposeError::Unchanged(id.clone()));
        }

        self.channel.emit(ClientEvent::EditMessage {
            message_id: id.clone(),
            new_text,
        });
        Ok(())
    }

    /// Select one of our messages for deletion.
    ///
    /// Nothing is sent until `confirm_delete(true)`.
    pub fn request_delete(&mut self, id: &MessageId) -> Result<(), ComposeError> {
        let entry = self
            .feed
            .get(id)
            .ok_or_else(|| ComposeError::UnknownMessage(id.clone()))?;
        if entry.author() != &self.current_user {
            return Err(ComposeError::NotAuthor(id.clone()));
        }
        self.pending_delete = Some(id.clone());
        Ok(())
    }

    /// Answer the confirmation of a pending delete.
    ///
    /// Returns whether a delete intent was emitted.
    pub fn confirm_delete(&mut self, accepted: bool) -> Result<bool, ComposeError> {
        let id = self
            .pending_delete
            .take()
            .ok_or(ComposeError::NoPendingDelete)?;
        if accepted {
            self.channel
                .emit(ClientEvent::DeleteMessage { message_id: id });
        }
        Ok(accepted)
    }

    /// React to a rendered message with `emoji`
    pub fn add_reaction(&mut self, id: &MessageId, emoji: &str) -> Result<(), ComposeError> {
        if !self.feed.contains(id) {
            return Err(ComposeError::UnknownMessage(id.clone()));
        }
        let emoji = emoji.trim();
        if emoji.is_empty() {
            return Err(ComposeError::NothingToSend);
        }
        self.channel.emit(ClientEvent::AddReaction {
            message_id: id.clone(),
            emoji: emoji.to_string(),
        });
        Ok(())
    }

    /// A key was pressed in the compose box.
    ///
    /// "typing" is sent once per burst; "stopped typing" follows when no key
    /// is pressed for the typing timeout.
    pub fn on_keystroke(&mut self, now: Timestamp) {
        if !self.local_typing {
            self.local_typing = true;
            self.channel.emit(ClientEvent::Typing { is_typing: true });
        }
        self.timers.typing_stop = Some(now.add_millis(self.config.typing_timeout_ms));
    }

    /// Follow a reply affordance: scroll to the replied-to message and highlight it.
    ///
    /// Returns `false` if the target is not rendered.
    pub fn jump_to_reply(&mut self, target: &MessageId, now: Timestamp) -> bool {
        if !self.feed.scroll_to(target) {
            tracing::debug!("Reply target '{}' is not rendered", target);
            return false;
        }
        if let Some(entry) = self.feed.get_mut(target) {
            entry.highlighted = true;
        }
        self.timers.cancel_highlight(target);
        self.timers
            .highlights
            .push((now.add_millis(self.config.highlight_ms), target.clone()));
        self.acknowledge_visible();
        true
    }

    /// Scroll the viewport by `delta` lines (negative is up).
    ///
    /// Reaching the top loads the next older page when there is one.
    pub fn scroll_by(&mut self, delta: isize) {
        self.feed.scroll_by(delta);
        self.acknowledge_visible();
        if self.feed.is_at_top() && self.load_more_available() {
            self.on_more_history_requested();
        }
    }
}
