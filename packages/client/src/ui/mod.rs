//! UI layer: message rendering, the feed view and the terminal front end.

pub mod command;
pub mod feed_view;
pub mod handler;
pub mod render;
pub mod terminal;
