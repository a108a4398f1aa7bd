//! Chat room client library.
//!
//! A terminal client for a Socket.IO chat room: ordered message feed, read
//! receipts, typing indicators, reactions, replies and paginated history.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod runner;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use error::ClientError;
pub use runner::{run_client, run_push};
