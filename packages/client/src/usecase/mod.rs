//! UseCase 層
//!
//! フィードの状態遷移を実装するレイヤー。
//! UI 層とインフラ層から呼び出され、Domain 層を操作します。

mod compose;
pub mod error;
pub mod feed_controller;
pub mod port;
mod timers;

pub use error::ComposeError;
pub use feed_controller::ChatFeedController;
pub use port::{
    ClientEvent, DesktopNotification, NOTIFICATION_ICON, NotificationId, Notifier, RealtimeChannel,
};
