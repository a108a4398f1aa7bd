//! Infrastructure 層
//!
//! 外部とのやり取りを実装するレイヤー。
//! Socket.IO のワイヤ形式、WebSocket 接続、UI 状態の保存先、端末通知を提供します。

pub mod attachment;
pub mod dto;
pub mod error;
pub mod notification;
pub mod push;
pub mod realtime;
pub mod repository;

pub use error::{ChannelError, DtoError};
