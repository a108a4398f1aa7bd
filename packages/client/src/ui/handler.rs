//! Server event handler.
//!
//! One arm per event kind: converts the payload DTOs into domain models and
//! calls the matching controller operation. Payloads that fail validation
//! are logged and dropped without touching the feed.

use crate::{
    domain::{Message, MessageId, MessageText, RosterEntry, Timestamp, UserName},
    infrastructure::dto::{MessageDto, ServerEvent},
    usecase::ChatFeedController,
};

/// Apply one server event to the controller
pub fn handle_server_event(
    controller: &mut ChatFeedController,
    event: ServerEvent,
    now: Timestamp,
) {
    match event {
        ServerEvent::Connect => controller.on_connected(),
        ServerEvent::Disconnect => controller.on_disconnected(),
        ServerEvent::Message(dto) => {
            if let Some(message) = convert_message(dto) {
                controller.on_message_received(message, now);
            }
        }
        ServerEvent::ChatHistory(history) => {
            let messages = convert_messages(history.messages);
            controller.on_history_loaded(messages, history.has_more);
        }
        ServerEvent::MoreMessages(page) => {
            let messages = convert_messages(page.messages);
            controller.on_older_page_received(messages, page.has_more);
        }
        ServerEvent::MessagesRead(read) => {
            let reader = match UserName::new(read.reader) {
                Ok(reader) => reader,
                Err(e) => {
                    tracing::warn!("Dropping messages_read: {}", e);
                    return;
                }
            };
            let ids: Vec<MessageId> = read
                .message_ids
                .into_iter()
                .filter_map(|id| MessageId::new(id).ok())
                .collect();
            controller.on_messages_read(&reader, &ids);
        }
        ServerEvent::MessageEdited(edit) => {
            match (MessageId::new(edit.message_id), MessageText::from_server(&edit.new_text)) {
                (Ok(id), Some(text)) => {
                    controller.on_message_edited(&id, text);
                }
                (Err(e), _) => tracing::warn!("Dropping edit_message: {}", e),
                (Ok(id), None) => tracing::warn!("Dropping edit_message for '{}': empty text", id),
            }
        }
        ServerEvent::MessageDeleted(delete) => match MessageId::new(delete.message_id) {
            Ok(id) => {
                controller.on_message_deleted(&id);
            }
            Err(e) => tracing::warn!("Dropping delete_message: {}", e),
        },
        ServerEvent::Typing(typing) => match UserName::new(typing.name) {
            Ok(user) => controller.on_typing_signal(user, typing.is_typing, now),
            Err(e) => tracing::warn!("Dropping typing: {}", e),
        },
        ServerEvent::ReactionsUpdated(update) => match MessageId::new(update.message_id) {
            Ok(id) => {
                controller.on_reaction_update(&id, update.reactions.into_iter().collect());
            }
            Err(e) => tracing::warn!("Dropping update_reactions: {}", e),
        },
        ServerEvent::UsersUpdated(users) => {
            let roster = users
                .users
                .into_iter()
                .filter_map(|dto| match RosterEntry::try_from(dto) {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        tracing::warn!("Dropping roster entry: {}", e);
                        None
                    }
                })
                .collect();
            controller.on_users_updated(roster);
        }
        ServerEvent::MessageRejected(rejected) => controller.on_message_rejected(&rejected.reason),
    }
}

fn convert_message(dto: MessageDto) -> Option<Message> {
    let id = dto.id.clone();
    match Message::try_from(dto) {
        Ok(message) => Some(message),
        Err(e) => {
            tracing::warn!("Dropping message '{}': {}", id, e);
            None
        }
    }
}

fn convert_messages(dtos: Vec<MessageDto>) -> Vec<Message> {
    dtos.into_iter().filter_map(convert_message).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::{
        config::FeedConfig,
        domain::{ReadState, UiState},
        infrastructure::dto::{HistoryDto, events::EditMessageDto},
        usecase::{
            ClientEvent,
            port::{MockNotifier, MockRealtimeChannel},
        },
    };
    use mockall::predicate::eq;
    use serde_json::json;

    fn user(name: &str) -> UserName {
        UserName::new(name.to_string()).unwrap()
    }

    fn id(value: &str) -> MessageId {
        MessageId::new(value.to_string()).unwrap()
    }

    fn dto(msg_id: &str, author: &str, text: &str, read_by: &[&str]) -> MessageDto {
        MessageDto {
            id: msg_id.to_string(),
            name: author.to_string(),
            message: Some(text.to_string()),
            image: None,
            reply_to: None,
            read_by: read_by.iter().map(|r| r.to_string()).collect(),
            reactions: BTreeMap::new(),
        }
    }

    fn controller(channel: MockRealtimeChannel) -> ChatFeedController {
        ChatFeedController::new(
            FeedConfig::default(),
            user("alice"),
            UiState::new(user("alice")),
            Box::new(channel),
            Box::new(MockNotifier::new()),
        )
    }

    #[test]
    fn test_history_skips_invalid_messages() {
        // テスト項目: 履歴のうち検証に失敗したメッセージだけが捨てられ、未読は既読通知される
        // given (前提条件):
        let mut channel = MockRealtimeChannel::new();
        channel
            .expect_emit()
            .with(eq(ClientEvent::MarkMessagesRead {
                message_ids: vec![id("m2")],
            }))
            .times(1)
            .return_const(());
        let mut feed = controller(channel);
        let history = HistoryDto {
            messages: vec![
                dto("m1", "bob", "seen", &["bob", "alice"]),
                dto("", "bob", "no id", &[]),
                dto("m2", "bob", "new", &["bob"]),
            ],
            has_more: true,
        };

        // when (操作):
        handle_server_event(&mut feed, ServerEvent::ChatHistory(history), Timestamp::new(0));

        // then (期待する結果):
        assert_eq!(feed.feed().ids(), &[id("m1"), id("m2")]);
        assert_eq!(feed.oldest_loaded(), Some(&id("m1")));
        assert!(feed.load_more_available());
    }

    #[test]
    fn test_edit_with_empty_text_is_dropped() {
        // テスト項目: 本文が空の編集通知は無視される
        // given (前提条件):
        let mut feed = controller(MockRealtimeChannel::new());
        handle_server_event(
            &mut feed,
            ServerEvent::Message(dto("m1", "alice", "original", &["alice"])),
            Timestamp::new(0),
        );

        // when (操作):
        handle_server_event(
            &mut feed,
            ServerEvent::MessageEdited(EditMessageDto {
                message_id: "m1".to_string(),
                new_text: "  ".to_string(),
            }),
            Timestamp::new(1),
        );

        // then (期待する結果):
        assert_eq!(feed.feed().get(&id("m1")).unwrap().rendered.body, "original");
    }

    #[test]
    fn test_long_message_from_server_is_appended_and_tracked() {
        // テスト項目: 10000 文字を超える本文のメッセージも捨てられずにフィードへ追加され、既読通知される
        // given (前提条件):
        let mut channel = MockRealtimeChannel::new();
        channel
            .expect_emit()
            .with(eq(ClientEvent::MarkMessagesRead {
                message_ids: vec![id("m1")],
            }))
            .times(1)
            .return_const(());
        let mut feed = controller(channel);
        let event = ServerEvent::decode(
            "message",
            json!({"id": "m1", "name": "bob", "message": "x".repeat(10001)}),
        )
        .unwrap();

        // when (操作):
        handle_server_event(&mut feed, event, Timestamp::new(0));

        // then (期待する結果):
        assert_eq!(feed.feed().ids(), &[id("m1")]);
        assert_eq!(feed.read_state(&id("m1")), Some(ReadState::PendingAck));
        assert_eq!(
            feed.feed().get(&id("m1")).unwrap().rendered.body.chars().count(),
            10001
        );
    }

    #[test]
    fn test_long_edit_from_server_is_applied() {
        // テスト項目: 10000 文字を超える編集通知も反映される
        // given (前提条件):
        let mut feed = controller(MockRealtimeChannel::new());
        handle_server_event(
            &mut feed,
            ServerEvent::Message(dto("m1", "alice", "original", &["alice"])),
            Timestamp::new(0),
        );
        let new_text = "y".repeat(10001);

        // when (操作):
        handle_server_event(
            &mut feed,
            ServerEvent::MessageEdited(EditMessageDto {
                message_id: "m1".to_string(),
                new_text: new_text.clone(),
            }),
            Timestamp::new(1),
        );

        // then (期待する結果):
        assert_eq!(feed.feed().get(&id("m1")).unwrap().rendered.body, new_text);
    }
}
