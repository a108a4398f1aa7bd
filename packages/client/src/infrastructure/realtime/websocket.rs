//! WebSocket transport for the realtime channel.
//!
//! One writer task drains the outbound queue into the socket; one reader
//! task answers pings, completes the namespace handshake and forwards
//! decoded server events. Neither task touches the feed.

use futures_util::{SinkExt, StreamExt, stream::SplitStream};
use tokio::{
    net::TcpStream,
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use crate::{
    infrastructure::{
        dto::{ServerEvent, encode_client_event},
        error::ChannelError,
    },
    usecase::{ClientEvent, RealtimeChannel},
};

use super::socketio::{self, CONNECT_FRAME, PONG_FRAME, Packet};

type WsReader = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Outgoing half of a Socket.IO connection
#[derive(Debug, Clone)]
pub struct WebSocketChannel {
    outbound: UnboundedSender<String>,
}

impl RealtimeChannel for WebSocketChannel {
    fn emit(&self, event: ClientEvent) {
        let (name, payload) = match encode_client_event(&event) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!("Failed to encode '{}': {}", event.name(), e);
                return;
            }
        };
        tracing::debug!("Emitting '{}'", name);
        if self
            .outbound
            .send(socketio::encode_event(name, &payload))
            .is_err()
        {
            tracing::warn!("Dropped '{}': connection closed", name);
        }
    }
}

/// Open a Socket.IO connection to `url`.
///
/// Returns the outgoing channel and the stream of inbound events. The stream
/// yields `ServerEvent::Disconnect` once and then ends when the socket closes.
pub async fn connect(
    url: &str,
) -> Result<(WebSocketChannel, UnboundedReceiver<ServerEvent>), ChannelError> {
    let (ws_stream, _) = connect_async(url).await?;
    tracing::info!("WebSocket connected to {}", url);

    let (mut ws_sender, ws_receiver) = ws_stream.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
    let (events_tx, events_rx) = mpsc::unbounded_channel::<ServerEvent>();

    // writer: outbound queue -> socket
    tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if let Err(e) = ws_sender.send(Message::Text(frame.into())).await {
                tracing::warn!("Failed to send frame: {}", e);
                break;
            }
        }
        let _ = ws_sender.close().await;
    });

    // reader: socket -> events
    let control_tx = outbound_tx.clone();
    tokio::spawn(async move {
        read_frames(ws_receiver, control_tx, &events_tx).await;
        let _ = events_tx.send(ServerEvent::Disconnect);
    });

    Ok((
        WebSocketChannel {
            outbound: outbound_tx,
        },
        events_rx,
    ))
}

/// Read until the socket or the namespace closes
async fn read_frames(
    mut receiver: WsReader,
    control: UnboundedSender<String>,
    events: &UnboundedSender<ServerEvent>,
) {
    while let Some(msg) = receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => {
                tracing::info!("Server closed the connection");
                return;
            }
            Ok(_) => continue,
            Err(e) => {
                tracing::error!("WebSocket error: {}", e);
                return;
            }
        };

        let packet = match socketio::decode(text.as_str()) {
            Ok(packet) => packet,
            Err(e) => {
                tracing::warn!("Dropping frame: {}", e);
                continue;
            }
        };

        match packet {
            Packet::Open(handshake) => {
                tracing::debug!("Engine.IO handshake: {}", handshake);
                let _ = control.send(CONNECT_FRAME.to_string());
            }
            Packet::Ping => {
                let _ = control.send(PONG_FRAME.to_string());
            }
            Packet::Pong | Packet::Noop => {}
            Packet::Connect => {
                if events.send(ServerEvent::Connect).is_err() {
                    return;
                }
            }
            Packet::ConnectError(reason) => {
                tracing::error!("Server refused the connection: {}", reason);
                return;
            }
            Packet::Disconnect | Packet::Close => return,
            Packet::Event { name, data } => match ServerEvent::decode(&name, data) {
                Ok(event) => {
                    if events.send(event).is_err() {
                        return;
                    }
                }
                Err(e) => tracing::warn!("Dropping event: {}", e),
            },
        }
    }
}
