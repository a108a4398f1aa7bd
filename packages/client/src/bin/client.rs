//! Terminal chat room client.
//!
//! Joins a Socket.IO chat room and shows the message feed with read
//! receipts, typing indicators and reactions.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-client -- chat --username alice
//! cargo run --bin hiroba-client -- push --payload '{"notification":{"title":"Hi","body":"bob: hello"}}'
//! ```

use clap::Parser;
use hiroba_client::config::{Cli, ClientConfig, Command};
use hiroba_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Chat(args) => hiroba_client::run_client(ClientConfig::from(args)).await,
        Command::Push(args) => hiroba_client::run_push(args),
    };

    if let Err(e) = result {
        tracing::error!("Client error: {}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
