//! Engine.IO v3 / Socket.IO v2 text packet codec.
//!
//! An Engine.IO packet is a one-digit type followed by its data. Type `4`
//! (message) carries a Socket.IO packet, itself a one-digit type followed by
//! an optional namespace, an optional ack id, and a JSON array. Only the
//! text framing is supported; binary attachments are not used by the server.

use crate::error::WsError;
use serde::Deserialize;
use serde_json::Value;

/// Engine.IO handshake carried by the open packet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Message(SocketPacket),
    Upgrade,
    Noop,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect,
    Disconnect,
    /// `["topic", payload]`. A missing payload decodes as `null`.
    Event { topic: String, payload: Value },
    Ack { id: u64 },
    Error(String),
}

impl EnginePacket {
    pub fn decode(text: &str) -> Result<Self, WsError> {
        let mut chars = text.chars();
        let kind = chars
            .next()
            .ok_or_else(|| WsError::ProtocolError("empty packet".into()))?;
        let data = chars.as_str();

        match kind {
            '0' => serde_json::from_str(data)
                .map(EnginePacket::Open)
                .map_err(|e| WsError::ProtocolError(format!("bad handshake: {}", e))),
            '1' => Ok(EnginePacket::Close),
            '2' => Ok(EnginePacket::Ping(data.to_string())),
            '3' => Ok(EnginePacket::Pong(data.to_string())),
            '4' => SocketPacket::decode(data).map(EnginePacket::Message),
            '5' => Ok(EnginePacket::Upgrade),
            '6' => Ok(EnginePacket::Noop),
            other => Err(WsError::ProtocolError(format!(
                "unknown engine packet type '{}'",
                other
            ))),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            EnginePacket::Open(_) => "0".to_string(),
            EnginePacket::Close => "1".to_string(),
            EnginePacket::Ping(data) => format!("2{}", data),
            EnginePacket::Pong(data) => format!("3{}", data),
            EnginePacket::Message(packet) => format!("4{}", packet.encode()),
            EnginePacket::Upgrade => "5".to_string(),
            EnginePacket::Noop => "6".to_string(),
        }
    }
}

impl SocketPacket {
    fn decode(data: &str) -> Result<Self, WsError> {
        let mut chars = data.chars();
        let kind = chars
            .next()
            .ok_or_else(|| WsError::ProtocolError("empty socket packet".into()))?;
        let rest = skip_namespace(chars.as_str());

        match kind {
            '0' => Ok(SocketPacket::Connect),
            '1' => Ok(SocketPacket::Disconnect),
            '2' => {
                let (_, json) = split_ack_id(rest);
                decode_event(json)
            }
            '3' => {
                let (id, _) = split_ack_id(rest);
                Ok(SocketPacket::Ack { id: id.unwrap_or_default() })
            }
            '4' => Ok(SocketPacket::Error(rest.trim_matches('"').to_string())),
            other => Err(WsError::ProtocolError(format!(
                "unsupported socket packet type '{}'",
                other
            ))),
        }
    }

    fn encode(&self) -> String {
        match self {
            SocketPacket::Connect => "0".to_string(),
            SocketPacket::Disconnect => "1".to_string(),
            SocketPacket::Event { topic, payload } => {
                format!("2{}", Value::Array(vec![Value::String(topic.clone()), payload.clone()]))
            }
            SocketPacket::Ack { id } => format!("3{}[]", id),
            SocketPacket::Error(message) => format!("4\"{}\"", message),
        }
    }
}

/// Drops a leading `/namespace,` (the default namespace is implicit).
fn skip_namespace(data: &str) -> &str {
    if data.starts_with('/') {
        match data.find(',') {
            Some(idx) => &data[idx + 1..],
            None => "",
        }
    } else {
        data
    }
}

fn split_ack_id(data: &str) -> (Option<u64>, &str) {
    let digits = data.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return (None, data);
    }
    (data[..digits].parse().ok(), &data[digits..])
}

fn decode_event(json: &str) -> Result<SocketPacket, WsError> {
    let args: Vec<Value> = serde_json::from_str(json)
        .map_err(|e| WsError::ProtocolError(format!("bad event body: {}", e)))?;
    let mut args = args.into_iter();
    let topic = match args.next() {
        Some(Value::String(topic)) => topic,
        _ => return Err(WsError::ProtocolError("event without topic".into())),
    };
    Ok(SocketPacket::Event {
        topic,
        payload: args.next().unwrap_or(Value::Null),
    })
}

/// WebSocket endpoint for `host`: `https` maps to `wss`, `http` to `ws`,
/// and a bare host is taken as `wss`.
pub fn socket_url(host: &str, access_token: &str) -> String {
    let host = host.trim_end_matches('/');
    let base = if let Some(rest) = host.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = host.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else if host.starts_with("wss://") || host.starts_with("ws://") {
        host.to_string()
    } else {
        format!("wss://{}", host)
    };
    format!(
        "{}/socket.io/?EIO=3&transport=websocket&access_token={}",
        base,
        urlencoding::encode(access_token)
    )
}
