//! Socket.IO event payloads exchanged with the chat server.
//!
//! Inbound payloads are decoded into [`ServerEvent`] first and converted to
//! domain models by the UI handler, so one bad field only drops one event.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    domain::{Message, MessageId, MessageText, ReplyRef, RosterEntry, UserName, ValueObjectError},
    infrastructure::error::DtoError,
    usecase::ClientEvent,
};

/// Message as stored and broadcast by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: String,
    /// Author's user name
    pub name: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub reply_to: Option<ReplyDto>,
    #[serde(default)]
    pub read_by: Vec<String>,
    #[serde(default)]
    pub reactions: BTreeMap<String, u32>,
}

/// Reply reference, `{id, message}` in both directions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyDto {
    pub id: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// `chat_history` and `more_messages`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryDto {
    pub messages: Vec<MessageDto>,
    #[serde(default, alias = "hasMore")]
    pub has_more: bool,
}

/// `messages_read`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessagesReadDto {
    pub reader: String,
    pub message_ids: Vec<String>,
}

/// `edit_message` broadcast
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EditMessageDto {
    #[serde(rename = "messageId")]
    pub message_id: String,
    #[serde(rename = "newText")]
    pub new_text: String,
}

/// `delete_message` broadcast
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeleteMessageDto {
    #[serde(rename = "messageId")]
    pub message_id: String,
}

/// `typing` broadcast
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TypingDto {
    pub name: String,
    #[serde(rename = "isTyping", default)]
    pub is_typing: bool,
}

/// `update_reactions`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReactionsDto {
    #[serde(rename = "messageId")]
    pub message_id: String,
    #[serde(default)]
    pub reactions: BTreeMap<String, u32>,
}

/// One member in `update_users`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterEntryDto {
    pub username: String,
    #[serde(default)]
    pub online: bool,
    #[serde(rename = "isFriend", default)]
    pub is_friend: bool,
}

/// `update_users`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UsersDto {
    pub users: Vec<RosterEntryDto>,
}

/// `message_rejected`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RejectedDto {
    #[serde(default)]
    pub reason: String,
}

/// Event received from the server, one variant per event name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    Connect,
    Disconnect,
    Message(MessageDto),
    ChatHistory(HistoryDto),
    MoreMessages(HistoryDto),
    MessagesRead(MessagesReadDto),
    MessageEdited(EditMessageDto),
    MessageDeleted(DeleteMessageDto),
    Typing(TypingDto),
    ReactionsUpdated(ReactionsDto),
    UsersUpdated(UsersDto),
    MessageRejected(RejectedDto),
}

impl ServerEvent {
    /// Decode the payload of the event called `name`
    pub fn decode(name: &str, data: Value) -> Result<Self, DtoError> {
        fn parse<T: DeserializeOwned>(name: &str, data: Value) -> Result<T, DtoError> {
            serde_json::from_value(data).map_err(|source| DtoError::Malformed {
                event: name.to_string(),
                source,
            })
        }

        let event = match name {
            "connect" => Self::Connect,
            "disconnect" => Self::Disconnect,
            "message" => Self::Message(parse(name, data)?),
            "chat_history" => Self::ChatHistory(parse(name, data)?),
            "more_messages" => Self::MoreMessages(parse(name, data)?),
            "messages_read" => Self::MessagesRead(parse(name, data)?),
            "edit_message" => Self::MessageEdited(parse(name, data)?),
            "delete_message" => Self::MessageDeleted(parse(name, data)?),
            "typing" => Self::Typing(parse(name, data)?),
            "update_reactions" => Self::ReactionsUpdated(parse(name, data)?),
            "update_users" => Self::UsersUpdated(parse(name, data)?),
            "message_rejected" => Self::MessageRejected(parse(name, data)?),
            other => return Err(DtoError::UnknownEvent(other.to_string())),
        };
        Ok(event)
    }
}

// ========================================
// DTO -> Domain Model
// ========================================

impl TryFrom<MessageDto> for Message {
    type Error = ValueObjectError;

    fn try_from(dto: MessageDto) -> Result<Self, Self::Error> {
        let mut message = Message::new(MessageId::new(dto.id)?, UserName::new(dto.name)?);

        // an empty body means an image-only message
        if let Some(text) = dto.message.as_deref().and_then(MessageText::from_server) {
            message = message.with_text(text);
        }
        if let Some(image) = dto.image {
            message = message.with_image(image);
        }
        if let Some(reply) = dto.reply_to {
            message = message.with_reply_to(ReplyRef {
                target: MessageId::new(reply.id)?,
                snippet: reply.message.unwrap_or_default(),
            });
        }
        for reader in dto.read_by {
            message.add_reader(UserName::new(reader)?);
        }
        message.reactions.replace_with(dto.reactions);

        Ok(message)
    }
}

impl TryFrom<RosterEntryDto> for RosterEntry {
    type Error = ValueObjectError;

    fn try_from(dto: RosterEntryDto) -> Result<Self, Self::Error> {
        Ok(RosterEntry {
            username: UserName::new(dto.username)?,
            online: dto.online,
            is_friend: dto.is_friend,
        })
    }
}

// ========================================
// Domain Model -> outgoing payload
// ========================================

#[derive(Serialize)]
struct SendMessagePayload<'a> {
    data: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
    #[serde(rename = "replyTo", skip_serializing_if = "Option::is_none")]
    reply_to: Option<ReplyDto>,
}

#[derive(Serialize)]
struct TypingPayload {
    #[serde(rename = "isTyping")]
    is_typing: bool,
}

#[derive(Serialize)]
struct MarkMessagesReadPayload<'a> {
    message_ids: Vec<&'a str>,
}

#[derive(Serialize)]
struct EditMessagePayload<'a> {
    #[serde(rename = "messageId")]
    message_id: &'a str,
    #[serde(rename = "newText")]
    new_text: &'a str,
}

#[derive(Serialize)]
struct DeleteMessagePayload<'a> {
    #[serde(rename = "messageId")]
    message_id: &'a str,
}

#[derive(Serialize)]
struct AddReactionPayload<'a> {
    #[serde(rename = "messageId")]
    message_id: &'a str,
    emoji: &'a str,
}

#[derive(Serialize)]
struct LoadMoreMessagesPayload<'a> {
    last_message_id: &'a str,
}

/// Encode an intent as `(event name, payload)`
pub fn encode_client_event(event: &ClientEvent) -> Result<(&'static str, Value), DtoError> {
    let payload = match event {
        ClientEvent::SendMessage {
            text,
            image,
            reply_to,
        } => serde_json::to_value(SendMessagePayload {
            data: text,
            image: image.as_deref(),
            reply_to: reply_to.as_ref().map(|r| ReplyDto {
                id: r.target.as_str().to_string(),
                message: Some(r.snippet.clone()),
            }),
        })?,
        ClientEvent::Typing { is_typing } => serde_json::to_value(TypingPayload {
            is_typing: *is_typing,
        })?,
        ClientEvent::MarkMessagesRead { message_ids } => {
            serde_json::to_value(MarkMessagesReadPayload {
                message_ids: message_ids.iter().map(MessageId::as_str).collect(),
            })?
        }
        ClientEvent::EditMessage {
            message_id,
            new_text,
        } => serde_json::to_value(EditMessagePayload {
            message_id: message_id.as_str(),
            new_text: new_text.as_str(),
        })?,
        ClientEvent::DeleteMessage { message_id } => {
            serde_json::to_value(DeleteMessagePayload {
                message_id: message_id.as_str(),
            })?
        }
        ClientEvent::AddReaction { message_id, emoji } => {
            serde_json::to_value(AddReactionPayload {
                message_id: message_id.as_str(),
                emoji,
            })?
        }
        ClientEvent::LoadMoreMessages { last_message_id } => {
            serde_json::to_value(LoadMoreMessagesPayload {
                last_message_id: last_message_id.as_str(),
            })?
        }
    };
    Ok((event.name(), payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReplyContext;
    use serde_json::json;

    fn id(value: &str) -> MessageId {
        MessageId::new(value.to_string()).unwrap()
    }

    #[test]
    fn test_decode_chat_history_with_has_more() {
        // テスト項目: chat_history のペイロードがメッセージ一覧と has_more にデコードされる
        // given (前提条件):
        let data = json!({
            "messages": [
                {"id": "m1", "name": "bob", "message": "hi", "read_by": ["bob"]},
                {"id": "m2", "name": "alice", "message": "", "image": "https://example.com/a.png"}
            ],
            "has_more": true
        });

        // when (操作):
        let event = ServerEvent::decode("chat_history", data).unwrap();

        // then (期待する結果):
        let ServerEvent::ChatHistory(history) = event else {
            panic!("expected chat_history, got {event:?}");
        };
        assert!(history.has_more);
        assert_eq!(history.messages.len(), 2);
        assert_eq!(history.messages[1].image.as_deref(), Some("https://example.com/a.png"));
    }

    #[test]
    fn test_history_without_has_more_defaults_to_false() {
        // テスト項目: has_more が省略された履歴はそれ以上ないものとして扱う
        // when (操作):
        let event = ServerEvent::decode("more_messages", json!({"messages": []})).unwrap();

        // then (期待する結果):
        assert_eq!(
            event,
            ServerEvent::MoreMessages(HistoryDto {
                messages: vec![],
                has_more: false
            })
        );
    }

    #[test]
    fn test_decode_unknown_and_malformed_events() {
        // テスト項目: 未知のイベントと形式不正なペイロードはエラーになる
        // when (操作):
        let unknown = ServerEvent::decode("status", json!({}));
        let malformed = ServerEvent::decode("typing", json!({"isTyping": true}));

        // then (期待する結果):
        assert!(matches!(unknown, Err(DtoError::UnknownEvent(name)) if name == "status"));
        assert!(matches!(malformed, Err(DtoError::Malformed { event, .. }) if event == "typing"));
    }

    #[test]
    fn test_message_dto_into_domain() {
        // テスト項目: 返信・既読者・リアクションを含むメッセージがドメインモデルに変換される
        // given (前提条件):
        let data = json!({
            "id": "m2",
            "name": "bob",
            "message": "sure",
            "reply_to": {"id": "m1", "message": "lunch?"},
            "read_by": ["bob", "alice", "bob"],
            "reactions": {"🎉": 2, "👍": 1}
        });
        let ServerEvent::Message(dto) = ServerEvent::decode("message", data).unwrap() else {
            panic!("expected message");
        };

        // when (操作):
        let message = Message::try_from(dto).unwrap();

        // then (期待する結果):
        assert_eq!(message.text.as_ref().map(MessageText::as_str), Some("sure"));
        assert_eq!(
            message.reply_to,
            Some(ReplyRef {
                target: id("m1"),
                snippet: "lunch?".to_string()
            })
        );
        assert_eq!(message.read_by.len(), 2);
        assert_eq!(message.reactions.count("🎉"), 2);
        assert_eq!(message.reactions.count("👍"), 1);
    }

    #[test]
    fn test_message_dto_with_empty_id_is_rejected() {
        // テスト項目: ID が空のメッセージは変換できない
        // given (前提条件):
        let dto = MessageDto {
            id: String::new(),
            name: "bob".to_string(),
            message: Some("hi".to_string()),
            image: None,
            reply_to: None,
            read_by: vec![],
            reactions: BTreeMap::new(),
        };

        // when (操作):
        let result = Message::try_from(dto);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::MessageIdEmpty));
    }

    #[test]
    fn test_message_dto_long_and_blank_bodies() {
        // テスト項目: 10000 文字を超える本文はそのまま変換され、空白のみの本文は本文なしになる
        // given (前提条件):
        let long = ServerEvent::decode(
            "message",
            json!({"id": "m1", "name": "bob", "message": "x".repeat(10001)}),
        )
        .unwrap();
        let blank = ServerEvent::decode(
            "message",
            json!({"id": "m2", "name": "bob", "message": "   "}),
        )
        .unwrap();
        let (ServerEvent::Message(long), ServerEvent::Message(blank)) = (long, blank) else {
            panic!("expected message events");
        };

        // when (操作):
        let long = Message::try_from(long).unwrap();
        let blank = Message::try_from(blank).unwrap();

        // then (期待する結果):
        assert_eq!(long.text.map(|t| t.as_str().len()), Some(10001));
        assert_eq!(blank.text, None);
        assert_eq!(blank.snippet(), "");
    }

    #[test]
    fn test_encode_reply_message() {
        // テスト項目: 返信付きの送信は data と replyTo {id, message} にエンコードされ、画像は省略される
        // given (前提条件):
        let event = ClientEvent::SendMessage {
            text: "hello".to_string(),
            image: None,
            reply_to: Some(ReplyContext {
                target: id("m1"),
                snippet: "lunch?".to_string(),
            }),
        };

        // when (操作):
        let (name, payload) = encode_client_event(&event).unwrap();

        // then (期待する結果):
        assert_eq!(name, "message");
        assert_eq!(
            payload,
            json!({"data": "hello", "replyTo": {"id": "m1", "message": "lunch?"}})
        );
    }

    #[test]
    fn test_encode_intents_use_server_field_names() {
        // テスト項目: 各操作がサーバーの期待するフィールド名でエンコードされる
        // when (操作):
        let typing = encode_client_event(&ClientEvent::Typing { is_typing: true }).unwrap();
        let read = encode_client_event(&ClientEvent::MarkMessagesRead {
            message_ids: vec![id("m1"), id("m2")],
        })
        .unwrap();
        let more = encode_client_event(&ClientEvent::LoadMoreMessages {
            last_message_id: id("m1"),
        })
        .unwrap();
        let react = encode_client_event(&ClientEvent::AddReaction {
            message_id: id("m1"),
            emoji: "👍".to_string(),
        })
        .unwrap();

        // then (期待する結果):
        assert_eq!(typing, ("typing", json!({"isTyping": true})));
        assert_eq!(
            read,
            ("mark_messages_read", json!({"message_ids": ["m1", "m2"]}))
        );
        assert_eq!(more, ("load_more_messages", json!({"last_message_id": "m1"})));
        assert_eq!(
            react,
            ("add_reaction", json!({"messageId": "m1", "emoji": "👍"}))
        );
    }
}
