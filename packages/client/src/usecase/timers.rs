//! Deadlines owned by the feed controller.
//!
//! The controller never sleeps; the runner asks for the next deadline and
//! calls `poll_timers` once it has passed.

use crate::domain::{MessageId, Timestamp};

use super::port::NotificationId;

#[derive(Debug, Default)]
pub(crate) struct Timers {
    /// When to send "stopped typing" for the local user (debounced)
    pub(crate) typing_stop: Option<Timestamp>,
    /// When to close the latest desktop notification
    pub(crate) notification: Option<(Timestamp, NotificationId)>,
    /// When each highlighted reply target reverts
    pub(crate) highlights: Vec<(Timestamp, MessageId)>,
}

impl Timers {
    /// Earliest deadline among the owned timers
    pub(crate) fn next_deadline(&self) -> Option<Timestamp> {
        let notification = self.notification.map(|(at, _)| at);
        let highlight = self.highlights.iter().map(|(at, _)| *at).min();
        [self.typing_stop, notification, highlight]
            .into_iter()
            .flatten()
            .min()
    }

    /// Take the typing-stop deadline if it is due
    pub(crate) fn take_due_typing_stop(&mut self, now: Timestamp) -> bool {
        match self.typing_stop {
            Some(at) if at <= now => {
                self.typing_stop = None;
                true
            }
            _ => false,
        }
    }

    /// Take the notification to dismiss if its lifetime is over
    pub(crate) fn take_due_notification(&mut self, now: Timestamp) -> Option<NotificationId> {
        match self.notification {
            Some((at, id)) if at <= now => {
                self.notification = None;
                Some(id)
            }
            _ => None,
        }
    }

    /// Remove and return highlights that are due
    pub(crate) fn take_due_highlights(&mut self, now: Timestamp) -> Vec<MessageId> {
        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.highlights)
            .into_iter()
            .partition(|(at, _)| *at <= now);
        self.highlights = pending;
        due.into_iter().map(|(_, id)| id).collect()
    }

    /// Forget the highlight of a message that left the feed
    pub(crate) fn cancel_highlight(&mut self, id: &MessageId) {
        self.highlights.retain(|(_, target)| target != id);
    }
}
