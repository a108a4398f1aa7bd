//! UseCase: チャットフィードの制御
//!
//! The controller is the single authority over the visible feed order, the
//! read/unread ledger and the intents sent to the server. It runs on one task
//! and every operation completes before the next one starts.
//!
//! ## Read tracking
//!
//! Messages from other users move `Unseen -> PendingAck -> Read`. Seeing any
//! unread message while the client is active acknowledges every unread
//! message in one `mark_messages_read` batch. Own messages are never tracked.
//!
//! ## Ordering
//!
//! The server decides the order: received messages are appended as they
//! arrive and sent messages only show up once the server echoes them.

use crate::{
    config::FeedConfig,
    domain::{
        Message, MessageId, MessageText, NotificationPermission, PaginationCursor, ReadLedger,
        ReadState, ReplyContext, RosterEntry, Timestamp, TypingSet, UiState, UserName,
    },
    ui::feed_view::{FeedEntry, FeedView},
};

use super::{
    port::{ClientEvent, DesktopNotification, NOTIFICATION_ICON, Notifier, RealtimeChannel},
    timers::Timers,
};

/// Chat feed controller for one room and one session
pub struct ChatFeedController {
    pub(super) config: FeedConfig,
    pub(super) current_user: UserName,
    pub(super) channel: Box<dyn RealtimeChannel>,
    pub(super) notifier: Box<dyn Notifier>,
    pub(super) ui_state: UiState,
    pub(super) ui_state_dirty: bool,
    pub(super) feed: FeedView,
    pub(super) ledger: ReadLedger,
    pub(super) cursor: PaginationCursor,
    pub(super) typing: TypingSet,
    pub(super) roster: Vec<RosterEntry>,
    pub(super) reply: Option<ReplyContext>,
    /// Text sent but not yet echoed back by the server
    pub(super) draft: Option<String>,
    pub(super) pending_delete: Option<MessageId>,
    /// Whether "typing" was sent without a matching "stopped typing"
    pub(super) local_typing: bool,
    pub(super) tab_active: bool,
    pub(super) connected: bool,
    pub(super) timers: Timers,
}

impl ChatFeedController {
    /// Create a controller for `session_user`.
    ///
    /// `ui_state` is the state loaded at startup; its cached user name is
    /// replaced by the session's.
    pub fn new(
        config: FeedConfig,
        session_user: UserName,
        mut ui_state: UiState,
        channel: Box<dyn RealtimeChannel>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let ui_state_dirty = ui_state.username != session_user;
        ui_state.username = session_user.clone();
        let feed = FeedView::new(config.viewport_lines);
        Self {
            config,
            current_user: session_user,
            channel,
            notifier,
            ui_state,
            ui_state_dirty,
            feed,
            ledger: ReadLedger::new(),
            cursor: PaginationCursor::new(),
            typing: TypingSet::new(),
            roster: Vec::new(),
            reply: None,
            draft: None,
            pending_delete: None,
            local_typing: false,
            tab_active: true,
            connected: false,
            timers: Timers::default(),
        }
    }

    // ========================================
    // Connection lifecycle
    // ========================================

    /// The realtime channel connected (or reconnected)
    pub fn on_connected(&mut self) {
        tracing::info!("Connected to server as '{}'", self.current_user);
        self.connected = true;
        if self.config.features.desktop_notifications
            && self.ui_state.notification_permission == NotificationPermission::Default
        {
            let permission = self.notifier.request_permission();
            tracing::info!("Notification permission: {:?}", permission);
            self.ui_state.notification_permission = permission;
            self.ui_state_dirty = true;
        }
    }

    /// The realtime channel disconnected.
    ///
    /// Remote typers are dropped since their "stopped typing" signals can no longer arrive.
    pub fn on_disconnected(&mut self) {
        tracing::info!("Disconnected from server");
        self.connected = false;
        self.typing = TypingSet::new();
    }

    // ========================================
    // History and pagination
    // ========================================

    /// Replace the whole feed with `messages` (oldest first).
    pub fn on_history_loaded(&mut self, messages: Vec<Message>, has_more: bool) {
        tracing::info!(
            "Loaded chat history: {} messages (has_more: {})",
            messages.len(),
            has_more
        );
        let entries = messages
            .iter()
            .map(|m| FeedEntry::from_message(m, &self.current_user))
            .collect();
        self.feed.replace_all(entries);

        self.ledger.clear();
        for message in &messages {
            self.track_read_state(message);
        }

        let oldest = messages.first().map(|m| m.id.clone());
        self.cursor
            .reset(oldest, has_more && self.config.features.pagination);

        self.acknowledge_visible();
    }

    /// Ask the server for the page before the cursor.
    ///
    /// Returns `true` if a request was emitted. Nothing is emitted while a
    /// request is in flight or once the history is exhausted.
    pub fn on_more_history_requested(&mut self) -> bool {
        if !self.config.features.pagination {
            return false;
        }
        match self.cursor.begin_request() {
            Some(last_message_id) => {
                tracing::debug!("Requesting messages older than '{}'", last_message_id);
                self.channel
                    .emit(ClientEvent::LoadMoreMessages { last_message_id });
                true
            }
            None => {
                tracing::debug!(
                    "Skipping history request (in flight: {}, more: {})",
                    self.cursor.in_flight(),
                    self.cursor.more_available()
                );
                false
            }
        }
    }

    /// Prepend an older page, keeping the viewport's distance from the bottom.
    pub fn on_older_page_received(&mut self, messages: Vec<Message>, has_more: bool) {
        tracing::info!(
            "Received older page: {} messages (has_more: {})",
            messages.len(),
            has_more
        );
        let entries = messages
            .iter()
            .filter(|m| !self.feed.contains(&m.id))
            .map(|m| FeedEntry::from_message(m, &self.current_user))
            .collect();
        self.feed.prepend(entries);

        for message in &messages {
            self.track_read_state(message);
        }

        let new_oldest = messages.first().map(|m| m.id.clone());
        self.cursor
            .complete(new_oldest, has_more && self.config.features.pagination);

        self.acknowledge_visible();
    }

    // ========================================
    // Live updates
    // ========================================

    /// Append a message delivered by the server.
    pub fn on_message_received(&mut self, message: Message, now: Timestamp) {
        self.feed
            .append(FeedEntry::from_message(&message, &self.current_user));

        if message.is_authored_by(&self.current_user) {
            // the server echoed our own message: the compose session is over
            self.reply = None;
            self.draft = None;
            return;
        }

        if message.is_read_by(&self.current_user) {
            self.ledger.track_read(message.id.clone());
            return;
        }

        self.ledger.track_unseen(message.id.clone());
        if self.tab_active {
            self.acknowledge_unread();
        } else {
            self.ui_state.unread_count = self.ui_state.unread_count.saturating_add(1);
            self.ui_state_dirty = true;
            self.notify_new_message(&message, now);
        }
    }

    /// Apply an edit broadcast by the server.
    ///
    /// Returns `false` (and does nothing) if the message is not rendered.
    pub fn on_message_edited(&mut self, id: &MessageId, new_text: MessageText) -> bool {
        match self.feed.get_mut(id) {
            Some(entry) => {
                entry.set_text(new_text);
                true
            }
            None => {
                tracing::debug!("Ignoring edit of message '{}' (not rendered)", id);
                false
            }
        }
    }

    /// Remove a message deleted on the server.
    ///
    /// Returns `false` (and does nothing) if the message is not rendered.
    pub fn on_message_deleted(&mut self, id: &MessageId) -> bool {
        if self.feed.remove(id).is_none() {
            tracing::debug!("Ignoring deletion of message '{}' (not rendered)", id);
            return false;
        }
        self.ledger.forget(id);
        self.cursor
            .replace_oldest(id, self.feed.first_id().cloned());
        self.timers.cancel_highlight(id);
        if self.reply.as_ref().is_some_and(|r| &r.target == id) {
            self.reply = None;
        }
        if self.pending_delete.as_ref() == Some(id) {
            self.pending_delete = None;
        }
        true
    }

    /// Record that `reader` has read `ids`.
    ///
    /// For the current user this completes pending acknowledgements; for
    /// anyone else the rendered entries get the "seen" marker.
    pub fn on_messages_read(&mut self, reader: &UserName, ids: &[MessageId]) {
        if reader == &self.current_user {
            let confirmed = self.ledger.confirm_read(ids);
            tracing::debug!("Server confirmed {} read acknowledgements", confirmed);
            return;
        }
        for id in ids {
            if let Some(entry) = self.feed.get_mut(id) {
                entry.seen_by_others = true;
            }
        }
    }

    /// Start or stop showing `user` as typing.
    pub fn on_typing_signal(&mut self, user: UserName, is_typing: bool, now: Timestamp) {
        if user == self.current_user {
            return;
        }
        if is_typing {
            self.typing.insert(user, now);
        } else {
            self.typing.remove(&user);
        }
    }

    /// Replace the reaction counts of a message.
    ///
    /// Returns `false` (and does nothing) if the message is not rendered.
    pub fn on_reaction_update(&mut self, id: &MessageId, reactions: Vec<(String, u32)>) -> bool {
        match self.feed.get_mut(id) {
            Some(entry) => {
                entry.reactions.replace_with(reactions);
                self.feed.clamp_scroll();
                true
            }
            None => {
                tracing::debug!("Ignoring reactions of message '{}' (not rendered)", id);
                false
            }
        }
    }

    /// Replace the room roster
    pub fn on_users_updated(&mut self, roster: Vec<RosterEntry>) {
        self.roster = roster;
    }

    /// The server refused a message; no retry is attempted.
    pub fn on_message_rejected(&mut self, reason: &str) {
        tracing::warn!("Message rejected: {}", reason);
        self.notifier
            .alert(&format!("Your message was not sent: {reason}"));
    }

    // ========================================
    // Read tracking
    // ========================================

    /// A message scrolled fully into the viewport.
    ///
    /// If it is unread, every unread message is acknowledged in one batch.
    /// Returns `true` if an acknowledgement was emitted.
    pub fn mark_visible(&mut self, id: &MessageId) -> bool {
        if !self.tab_active || !self.ledger.is_unseen(id) {
            return false;
        }
        self.acknowledge_unread()
    }

    /// The client gained or lost the foreground.
    pub fn on_visibility_change(&mut self, is_active: bool) {
        self.tab_active = is_active;
        if !is_active {
            return;
        }
        if self.ui_state.unread_count > 0 || self.ledger.has_unseen() {
            self.acknowledge_unread();
            self.ui_state.unread_count = 0;
            self.ui_state_dirty = true;
        }
    }

    // ========================================
    // Timers
    // ========================================

    /// Earliest time at which `poll_timers` has work to do
    pub fn next_deadline(&self) -> Option<Timestamp> {
        let typing_expiry = self
            .config
            .typing_expiry_ms
            .and_then(|ttl| self.typing.next_expiry(ttl));
        [self.timers.next_deadline(), typing_expiry]
            .into_iter()
            .flatten()
            .min()
    }

    /// Fire every deadline at or before `now`.
    pub fn poll_timers(&mut self, now: Timestamp) {
        if self.timers.take_due_typing_stop(now) && self.local_typing {
            self.local_typing = false;
            self.channel.emit(ClientEvent::Typing { is_typing: false });
        }

        if let Some(notification) = self.timers.take_due_notification(now) {
            self.notifier.dismiss(notification);
        }

        for id in self.timers.take_due_highlights(now) {
            if let Some(entry) = self.feed.get_mut(&id) {
                entry.highlighted = false;
            }
        }

        if let Some(ttl) = self.config.typing_expiry_ms
            && self.typing.expire(now, ttl)
        {
            tracing::debug!("Dropped typing users silent for {} ms", ttl);
        }
    }

    // ========================================
    // Accessors used by the terminal view
    // ========================================

    pub fn current_user(&self) -> &UserName {
        &self.current_user
    }

    pub fn feed(&self) -> &FeedView {
        &self.feed
    }

    /// Typing indicator text, `None` when hidden
    pub fn typing_summary(&self) -> Option<String> {
        self.typing.summary()
    }

    /// `(<unread>) <title>` while there are unread messages, the plain title otherwise
    pub fn window_title(&self) -> String {
        match self.ui_state.unread_count {
            0 => self.config.base_title.clone(),
            n => format!("({n}) {}", self.config.base_title),
        }
    }

    pub fn reply_context(&self) -> Option<&ReplyContext> {
        self.reply.as_ref()
    }

    /// Text sent but not yet echoed back
    pub fn draft(&self) -> Option<&str> {
        self.draft.as_deref()
    }

    pub fn pending_delete(&self) -> Option<&MessageId> {
        self.pending_delete.as_ref()
    }

    pub fn roster(&self) -> &[RosterEntry] {
        &self.roster
    }

    /// Whether the "load more" affordance is shown
    pub fn load_more_available(&self) -> bool {
        self.config.features.pagination && self.cursor.more_available()
    }

    pub fn is_loading_more(&self) -> bool {
        self.cursor.in_flight()
    }

    pub fn oldest_loaded(&self) -> Option<&MessageId> {
        self.cursor.oldest()
    }

    pub fn unread_count(&self) -> u32 {
        self.ui_state.unread_count
    }

    /// Unread message ids in delivery order
    pub fn unread_ids(&self) -> &[MessageId] {
        self.ledger.unseen_ids()
    }

    pub fn read_state(&self, id: &MessageId) -> Option<ReadState> {
        self.ledger.state(id)
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_active(&self) -> bool {
        self.tab_active
    }

    pub fn is_typing(&self) -> bool {
        self.local_typing
    }

    pub fn ui_state(&self) -> &UiState {
        &self.ui_state
    }

    /// UI state to persist, if it changed since the last call
    pub fn take_dirty_ui_state(&mut self) -> Option<UiState> {
        if !self.ui_state_dirty {
            return None;
        }
        self.ui_state_dirty = false;
        Some(self.ui_state.clone())
    }

    // ========================================
    // Internals
    // ========================================

    fn track_read_state(&mut self, message: &Message) {
        if message.is_authored_by(&self.current_user) {
            return;
        }
        if message.is_read_by(&self.current_user) {
            self.ledger.track_read(message.id.clone());
        } else {
            self.ledger.track_unseen(message.id.clone());
        }
    }

    /// Acknowledge all unread messages if any of them is on screen
    pub(super) fn acknowledge_visible(&mut self) {
        if !self.tab_active {
            return;
        }
        let unread_on_screen = self
            .feed
            .visible_ids()
            .iter()
            .any(|id| self.ledger.is_unseen(id));
        if unread_on_screen {
            self.acknowledge_unread();
        }
    }

    /// Emit one read-acknowledgement for every unread message.
    ///
    /// Returns `false` if nothing was unread.
    fn acknowledge_unread(&mut self) -> bool {
        let batch = self.ledger.begin_ack();
        let Some(last) = batch.last().cloned() else {
            return false;
        };
        tracing::debug!("Acknowledging {} messages up to '{}'", batch.len(), last);
        self.channel
            .emit(ClientEvent::MarkMessagesRead { message_ids: batch });
        self.ui_state.unread_count = 0;
        self.ui_state.last_read_message_id = Some(last);
        self.ui_state_dirty = true;
        true
    }

    fn notify_new_message(&mut self, message: &Message, now: Timestamp) {
        if !self.config.features.desktop_notifications
            || self.ui_state.notification_permission != NotificationPermission::Granted
            || self.tab_active
        {
            return;
        }
        let body = match &message.text {
            Some(text) => text.as_str().to_string(),
            None => "New image message".to_string(),
        };
        let notification = DesktopNotification {
            title: format!("New message from {}", message.author),
            body,
            icon: NOTIFICATION_ICON.to_string(),
        };
        let id = self.notifier.show(&notification);

        // only the latest notification keeps a dismissal timer
        if let Some((_, previous)) = self.timers.notification.take() {
            self.notifier.dismiss(previous);
        }
        let dismiss_at = now.add_millis(self.config.notification_timeout_ms);
        self.timers.notification = Some((dismiss_at, id));
    }
}
