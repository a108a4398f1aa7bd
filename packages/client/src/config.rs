//! Client configuration: command-line arguments and the settings derived from them.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Default Socket.IO endpoint (Engine.IO v4 over WebSocket)
pub const DEFAULT_URL: &str = "ws://127.0.0.1:5000/socket.io/?EIO=4&transport=websocket";

/// Default state file, relative to the working directory
pub const DEFAULT_STATE_FILE: &str = ".hiroba-state.json";

/// Optional parts of the client that used to differ between deployments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedFeatures {
    /// Load older history on demand
    pub pagination: bool,
    /// Desktop notifications for messages received while away, and push display
    pub desktop_notifications: bool,
}

impl Default for FeedFeatures {
    fn default() -> Self {
        Self {
            pagination: true,
            desktop_notifications: true,
        }
    }
}

/// Settings of the feed controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub features: FeedFeatures,
    /// Quiet period after the last keystroke before "stopped typing" is sent
    pub typing_timeout_ms: u64,
    /// Lifetime of a desktop notification
    pub notification_timeout_ms: u64,
    /// How long a jumped-to reply target stays highlighted
    pub highlight_ms: u64,
    /// Drop a remote typer after this much silence; `None` keeps them until "stopped typing"
    pub typing_expiry_ms: Option<u64>,
    /// Height of the feed viewport in lines
    pub viewport_lines: usize,
    /// Window title without the unread prefix
    pub base_title: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            features: FeedFeatures::default(),
            typing_timeout_ms: 1_000,
            notification_timeout_ms: 5_000,
            highlight_ms: 2_000,
            typing_expiry_ms: Some(6_000),
            viewport_lines: 20,
            base_title: "Hiroba".to_string(),
        }
    }
}

/// Full client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Socket.IO WebSocket URL
    pub url: String,
    /// Name of the current user for this session
    pub username: String,
    /// Where the UI state is persisted
    pub state_file: PathBuf,
    pub feed: FeedConfig,
}

/// Command-line interface of `hiroba-client`
#[derive(Debug, Parser)]
#[command(name = "hiroba-client", version, about = "Chat room client for Hiroba")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Join the chat room
    Chat(ClientArgs),
    /// Display a background push notification payload
    Push(PushArgs),
}

/// Arguments of the `chat` subcommand
#[derive(Debug, Clone, Args)]
pub struct ClientArgs {
    /// Socket.IO WebSocket URL
    #[arg(long, default_value = DEFAULT_URL)]
    pub url: String,

    /// User name for this session
    #[arg(short, long)]
    pub username: String,

    /// Window title shown above the feed
    #[arg(long, default_value = "Hiroba")]
    pub room_title: String,

    /// File where unread count, last-read marker and user name are kept
    #[arg(long, default_value = DEFAULT_STATE_FILE)]
    pub state_file: PathBuf,

    /// Disable loading older history
    #[arg(long)]
    pub no_pagination: bool,

    /// Disable desktop notifications
    #[arg(long)]
    pub no_notifications: bool,

    /// Quiet period before "stopped typing" is sent
    #[arg(long, default_value_t = 1_000)]
    pub typing_timeout_ms: u64,

    /// Lifetime of a desktop notification
    #[arg(long, default_value_t = 5_000)]
    pub notification_timeout_ms: u64,

    /// Highlight duration of a jumped-to reply target
    #[arg(long, default_value_t = 2_000)]
    pub highlight_ms: u64,

    /// Drop a remote typer after this many seconds of silence (0 disables)
    #[arg(long, default_value_t = 6)]
    pub typing_expiry_secs: u64,

    /// Height of the feed viewport in lines
    #[arg(long, default_value_t = 20)]
    pub viewport_lines: usize,
}

/// Arguments of the `push` subcommand
#[derive(Debug, Clone, Args)]
pub struct PushArgs {
    /// Push payload JSON, e.g. {"notification":{"title":"..","body":".."}}
    #[arg(long)]
    pub payload: String,

    /// Disable desktop notifications
    #[arg(long)]
    pub no_notifications: bool,
}

impl From<ClientArgs> for ClientConfig {
    fn from(args: ClientArgs) -> Self {
        let typing_expiry_ms = match args.typing_expiry_secs {
            0 => None,
            secs => Some(secs.saturating_mul(1_000)),
        };
        Self {
            url: args.url,
            username: args.username,
            state_file: args.state_file,
            feed: FeedConfig {
                features: FeedFeatures {
                    pagination: !args.no_pagination,
                    desktop_notifications: !args.no_notifications,
                },
                typing_timeout_ms: args.typing_timeout_ms,
                notification_timeout_ms: args.notification_timeout_ms,
                highlight_ms: args.highlight_ms,
                typing_expiry_ms,
                viewport_lines: args.viewport_lines.max(1),
                base_title: args.room_title,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_feed_config_default() {
        // テスト項目: 引数を省略した場合の設定が FeedConfig::default と一致する
        // given (前提条件):
        let cli = Cli::parse_from(["hiroba-client", "chat", "--username", "alice"]);

        // when (操作):
        let Command::Chat(args) = cli.command else {
            panic!("expected chat subcommand");
        };
        let config = ClientConfig::from(args);

        // then (期待する結果):
        assert_eq!(config.username, "alice");
        assert_eq!(config.url, DEFAULT_URL);
        assert_eq!(config.feed, FeedConfig::default());
    }

    #[test]
    fn test_feature_flags_and_zero_expiry() {
        // テスト項目: 機能フラグと入力中表示の失効無効化が反映される
        // given (前提条件):
        let cli = Cli::parse_from([
            "hiroba-client",
            "chat",
            "-u",
            "bob",
            "--no-pagination",
            "--no-notifications",
            "--typing-expiry-secs",
            "0",
        ]);

        // when (操作):
        let Command::Chat(args) = cli.command else {
            panic!("expected chat subcommand");
        };
        let config = ClientConfig::from(args);

        // then (期待する結果):
        assert!(!config.feed.features.pagination);
        assert!(!config.feed.features.desktop_notifications);
        assert_eq!(config.feed.typing_expiry_ms, None);
    }
}
