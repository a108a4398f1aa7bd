//! Shared test fixtures: recording ports and message builders.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use hiroba_client::{
    config::FeedConfig,
    domain::{
        Message, MessageId, MessageText, NotificationPermission, ReplyRef, UiState, UserName,
    },
    usecase::{
        ChatFeedController, ClientEvent, DesktopNotification, NotificationId, Notifier,
        RealtimeChannel,
    },
};

/// Channel that records every emitted intent
#[derive(Clone, Default)]
pub struct RecordingChannel {
    events: Arc<Mutex<Vec<ClientEvent>>>,
}

impl RecordingChannel {
    /// Emitted events so far, oldest first
    pub fn events(&self) -> Vec<ClientEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Drain the recorded events
    pub fn take(&self) -> Vec<ClientEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    pub fn count(&self, name: &str) -> usize {
        self.events().iter().filter(|e| e.name() == name).count()
    }
}

impl RealtimeChannel for RecordingChannel {
    fn emit(&self, event: ClientEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierCall {
    RequestPermission,
    Show(DesktopNotification),
    Dismiss(NotificationId),
    Alert(String),
}

/// Notifier that records every call and answers with a fixed permission
#[derive(Clone)]
pub struct RecordingNotifier {
    calls: Arc<Mutex<Vec<NotifierCall>>>,
    permission: NotificationPermission,
    next_id: Arc<Mutex<u64>>,
}

impl RecordingNotifier {
    pub fn new(permission: NotificationPermission) -> Self {
        Self {
            calls: Arc::default(),
            permission,
            next_id: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<NotifierCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn request_permission(&mut self) -> NotificationPermission {
        self.calls.lock().unwrap().push(NotifierCall::RequestPermission);
        self.permission
    }

    fn show(&mut self, notification: &DesktopNotification) -> NotificationId {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        self.calls
            .lock()
            .unwrap()
            .push(NotifierCall::Show(notification.clone()));
        NotificationId(*next_id)
    }

    fn dismiss(&mut self, id: NotificationId) {
        self.calls.lock().unwrap().push(NotifierCall::Dismiss(id));
    }

    fn alert(&mut self, message: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(NotifierCall::Alert(message.to_string()));
    }
}

/// Controller for "alice" wired to recording ports
pub struct TestFeed {
    pub controller: ChatFeedController,
    pub channel: RecordingChannel,
    pub notifier: RecordingNotifier,
}

impl TestFeed {
    pub fn new() -> Self {
        Self::with_config(FeedConfig::default())
    }

    pub fn with_config(config: FeedConfig) -> Self {
        let channel = RecordingChannel::default();
        let notifier = RecordingNotifier::new(NotificationPermission::Granted);
        let controller = ChatFeedController::new(
            config,
            user("alice"),
            UiState::new(user("alice")),
            Box::new(channel.clone()),
            Box::new(notifier.clone()),
        );
        Self {
            controller,
            channel,
            notifier,
        }
    }
}

pub fn user(name: &str) -> UserName {
    UserName::new(name.to_string()).unwrap()
}

pub fn id(value: &str) -> MessageId {
    MessageId::new(value.to_string()).unwrap()
}

/// Text message as the server delivers it: the author is always a reader
pub fn message(msg_id: &str, author: &str, text: &str) -> Message {
    let mut message =
        Message::new(id(msg_id), user(author)).with_text(MessageText::new(text).unwrap());
    message.add_reader(user(author));
    message
}

pub fn reply(msg_id: &str, author: &str, text: &str, target: &str, snippet: &str) -> Message {
    message(msg_id, author, text).with_reply_to(ReplyRef {
        target: id(target),
        snippet: snippet.to_string(),
    })
}

/// `count` messages from bob, ids `m1..=m{count}`
pub fn history(count: usize) -> Vec<Message> {
    (1..=count)
        .map(|n| message(&format!("m{n}"), "bob", &format!("message {n}")))
        .collect()
}

/// Image-only message with no text
pub fn image_message(msg_id: &str, author: &str) -> Message {
    let mut message =
        Message::new(id(msg_id), user(author)).with_image("https://example.com/photo.png");
    message.add_reader(user(author));
    message
}
