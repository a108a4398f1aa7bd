//! Data Transfer Objects
//!
//! Socket.IO イベントのペイロード形式と、ドメインモデルとの変換を定義します。

pub mod events;

pub use events::{
    HistoryDto, MessageDto, ReplyDto, RosterEntryDto, ServerEvent, encode_client_event,
};
