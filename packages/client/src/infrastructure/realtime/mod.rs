//! Realtime channel over Socket.IO
//!
//! `RealtimeChannel` trait（UseCase 層）の WebSocket 実装と、そのフレーム形式。

pub mod socketio;
pub mod websocket;

pub use websocket::{WebSocketChannel, connect};
