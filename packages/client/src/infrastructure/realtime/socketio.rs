//! Engine.IO v4 / Socket.IO v5 text framing over WebSocket.
//!
//! Only the default namespace and text packets are supported:
//!
//! ```text
//! 0{...}            open (handshake data)
//! 1                 close
//! 2 / 3             ping / pong
//! 6                 noop
//! 40[{...}]         namespace connect
//! 41                namespace disconnect
//! 42["name",data]   event
//! 44{...}           namespace connect error
//! ```

use serde_json::Value;

use crate::infrastructure::error::DtoError;

/// Namespace connect request sent after the Engine.IO handshake
pub const CONNECT_FRAME: &str = "40";

/// Reply to a server ping
pub const PONG_FRAME: &str = "3";

/// Decoded frame
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Open(Value),
    Close,
    Ping,
    Pong,
    Noop,
    Connect,
    Disconnect,
    Event { name: String, data: Value },
    ConnectError(Value),
}

/// Decode one text frame
pub fn decode(frame: &str) -> Result<Packet, DtoError> {
    let mut chars = frame.chars();
    let engine_type = chars
        .next()
        .ok_or_else(|| DtoError::Frame("empty frame".to_string()))?;
    let rest = chars.as_str();

    match engine_type {
        '0' => Ok(Packet::Open(parse_json(rest)?)),
        '1' => Ok(Packet::Close),
        '2' => Ok(Packet::Ping),
        '3' => Ok(Packet::Pong),
        '6' => Ok(Packet::Noop),
        '4' => decode_socket_packet(rest),
        other => Err(DtoError::Frame(format!(
            "unsupported engine packet type '{other}'"
        ))),
    }
}

fn decode_socket_packet(body: &str) -> Result<Packet, DtoError> {
    let mut chars = body.chars();
    let socket_type = chars
        .next()
        .ok_or_else(|| DtoError::Frame("missing socket packet type".to_string()))?;
    let rest = chars.as_str();

    match socket_type {
        '0' => Ok(Packet::Connect),
        '1' => Ok(Packet::Disconnect),
        '2' => decode_event(rest),
        '4' => Ok(Packet::ConnectError(parse_json(rest)?)),
        other => Err(DtoError::Frame(format!(
            "unsupported socket packet type '{other}'"
        ))),
    }
}

fn decode_event(body: &str) -> Result<Packet, DtoError> {
    // acknowledgement ids precede the array; this client never requests acks
    let body = body.trim_start_matches(|c: char| c.is_ascii_digit());
    let Value::Array(mut items) = parse_json(body)? else {
        return Err(DtoError::Frame("event payload is not an array".to_string()));
    };
    if items.is_empty() {
        return Err(DtoError::Frame("event without a name".to_string()));
    }
    let Value::String(name) = items.remove(0) else {
        return Err(DtoError::Frame("event name is not a string".to_string()));
    };
    let data = if items.is_empty() {
        Value::Null
    } else {
        items.remove(0)
    };
    Ok(Packet::Event { name, data })
}

fn parse_json(body: &str) -> Result<Value, DtoError> {
    if body.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| DtoError::Frame(e.to_string()))
}

/// Encode an event frame: `42["name",data]`
pub fn encode_event(name: &str, data: &Value) -> String {
    let array = Value::Array(vec![Value::String(name.to_string()), data.clone()]);
    format!("42{array}")
}
