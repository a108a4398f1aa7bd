//! Read/unread bookkeeping for messages written by other users.
//!
//! Each tracked message moves `Unseen -> PendingAck -> Read` and never back.
//! Own messages are never tracked.

use std::collections::HashMap;

use super::value_object::MessageId;

/// Read state of a message authored by someone else
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadState {
    /// Delivered but not yet seen by the current user
    Unseen,
    /// Seen; a read-acknowledgement has been emitted
    PendingAck,
    /// The server confirmed the acknowledgement
    Read,
}

/// Ledger of read states; the `Unseen` ids form the unread set.
#[derive(Debug, Clone, Default)]
pub struct ReadLedger {
    states: HashMap<MessageId, ReadState>,
    /// Unseen ids in delivery order, so acknowledgement batches follow the feed
    unseen: Vec<MessageId>,
}

impl ReadLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `id` as unseen.
    ///
    /// Ids already tracked keep their state. Returns `true` if the id was added.
    pub fn track_unseen(&mut self, id: MessageId) -> bool {
        if self.states.contains_key(&id) {
            return false;
        }
        self.states.insert(id.clone(), ReadState::Unseen);
        self.unseen.push(id);
        true
    }

    /// Start tracking `id` as already read (e.g. history already acknowledged).
    pub fn track_read(&mut self, id: MessageId) {
        if !self.states.contains_key(&id) {
            self.states.insert(id, ReadState::Read);
        }
    }

    pub fn state(&self, id: &MessageId) -> Option<ReadState> {
        self.states.get(id).copied()
    }

    pub fn is_unseen(&self, id: &MessageId) -> bool {
        self.state(id) == Some(ReadState::Unseen)
    }

    /// Currently unread ids in delivery order
    pub fn unseen_ids(&self) -> &[MessageId] {
        &self.unseen
    }

    pub fn unseen_len(&self) -> usize {
        self.unseen.len()
    }

    pub fn has_unseen(&self) -> bool {
        !self.unseen.is_empty()
    }

    /// Move every unseen id to `PendingAck` and return them as one batch.
    ///
    /// The unread set is empty afterwards.
    pub fn begin_ack(&mut self) -> Vec<MessageId> {
        let batch = std::mem::take(&mut self.unseen);
        for id in &batch {
            self.states.insert(id.clone(), ReadState::PendingAck);
        }
        batch
    }

    /// Mark `ids` as read after the server confirmed the acknowledgement.
    ///
    /// Ids acknowledged from another session jump straight to `Read`.
    /// Returns how many ids changed state.
    pub fn confirm_read<'a, I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = &'a MessageId>,
    {
        let mut changed = 0;
        for id in ids {
            if let Some(state) = self.states.get_mut(id)
                && *state != ReadState::Read
            {
                *state = ReadState::Read;
                changed += 1;
            }
            self.unseen.retain(|u| u != id);
        }
        changed
    }

    /// Stop tracking a message that left the feed
    pub fn forget(&mut self, id: &MessageId) {
        self.states.remove(id);
        self.unseen.retain(|u| u != id);
    }

    /// Drop every tracked message
    pub fn clear(&mut self) {
        self.states.clear();
        self.unseen.clear();
    }
}
