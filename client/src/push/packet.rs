//! Engine.IO v4 / Socket.IO v5 text framing
//!
//! Only the subset the push listener needs: handshake, heartbeat, namespace
//! connect, events and connect errors. Binary attachments are not supported.

use crate::error::{AppError, Result};
use serde::Deserialize;
use serde_json::Value;

/// Engine.IO packet
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Message(SocketPacket),
    Upgrade,
    Noop,
}

/// Payload of the Engine.IO open packet
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
}

/// Socket.IO packet carried in an Engine.IO message
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect(Option<Value>),
    Disconnect,
    Event { name: String, payload: Value },
    ConnectError(String),
    /// Acks and binary packets, which the listener ignores
    Other(char),
}

/// Client reply to a ping
pub fn pong(payload: &str) -> String {
    format!("3{}", payload)
}

/// Connect to the default namespace
pub fn connect_namespace() -> String {
    "40".to_string()
}

/// Disconnect from the default namespace
pub fn disconnect_namespace() -> String {
    "41".to_string()
}

pub fn decode(frame: &str) -> Result<Packet> {
    let mut chars = frame.chars();
    let kind = chars
        .next()
        .ok_or_else(|| AppError::Push("Empty push frame".to_string()))?;
    let body = chars.as_str();

    match kind {
        '0' => {
            let handshake: Handshake = serde_json::from_str(body)?;
            Ok(Packet::Open(handshake))
        }
        '1' => Ok(Packet::Close),
        '2' => Ok(Packet::Ping(body.to_string())),
        '3' => Ok(Packet::Pong(body.to_string())),
        '4' => decode_socket(body).map(Packet::Message),
        '5' => Ok(Packet::Upgrade),
        '6' => Ok(Packet::Noop),
        other => Err(AppError::Push(format!("Unknown packet type: {}", other))),
    }
}

fn decode_socket(body: &str) -> Result<SocketPacket> {
    let mut chars = body.chars();
    let kind = chars
        .next()
        .ok_or_else(|| AppError::Push("Empty socket packet".to_string()))?;
    let mut rest = chars.as_str();

    // namespace, e.g. "/admin,"
    if rest.starts_with('/') {
        rest = match rest.find(',') {
            Some(idx) => &rest[idx + 1..],
            None => "",
        };
    }

    // ack id
    let ack_len = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    rest = &rest[ack_len..];

    match kind {
        '0' => {
            if rest.is_empty() {
                Ok(SocketPacket::Connect(None))
            } else {
                Ok(SocketPacket::Connect(Some(serde_json::from_str(rest)?)))
            }
        }
        '1' => Ok(SocketPacket::Disconnect),
        '2' => {
            let mut args: Vec<Value> = serde_json::from_str(rest)?;
            if args.is_empty() {
                return Err(AppError::Push("Event without a name".to_string()));
            }
            let name = match args.remove(0) {
                Value::String(name) => name,
                other => return Err(AppError::Push(format!("Invalid event name: {}", other))),
            };
            let payload = if args.is_empty() {
                Value::Null
            } else {
                args.remove(0)
            };
            Ok(SocketPacket::Event { name, payload })
        }
        '4' => {
            let message = match serde_json::from_str::<Value>(rest) {
                Ok(Value::Object(map)) => map
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("connection refused")
                    .to_string(),
                Ok(Value::String(message)) => message,
                _ => rest.to_string(),
            };
            Ok(SocketPacket::ConnectError(message))
        }
        other => Ok(SocketPacket::Other(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_handshake() {
        let packet =
            decode(r#"0{"sid":"lv_VI97HAXpY6yYWAAAC","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#)
                .unwrap();
        match packet {
            Packet::Open(handshake) => {
                assert_eq!(handshake.sid, "lv_VI97HAXpY6yYWAAAC");
                assert_eq!(handshake.ping_interval, 25000);
            }
            other => panic!("expected open, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_heartbeat_and_close() {
        assert_eq!(decode("2").unwrap(), Packet::Ping(String::new()));
        assert_eq!(decode("2probe").unwrap(), Packet::Ping("probe".to_string()));
        assert_eq!(decode("1").unwrap(), Packet::Close);
        assert_eq!(pong("probe"), "3probe");
    }

    #[test]
    fn test_decode_event() {
        let packet = decode(r#"42["bill-updated",{"_id":"1","name":"Rent"}]"#).unwrap();
        assert_eq!(
            packet,
            Packet::Message(SocketPacket::Event {
                name: "bill-updated".to_string(),
                payload: json!({"_id": "1", "name": "Rent"}),
            })
        );
    }

    #[test]
    fn test_decode_event_with_namespace_and_ack() {
        let packet = decode(r#"42/bills,12["bill-updated",{"name":"Water"}]"#).unwrap();
        assert!(matches!(
            packet,
            Packet::Message(SocketPacket::Event { ref name, .. }) if name == "bill-updated"
        ));
    }

    #[test]
    fn test_decode_connect_and_error() {
        assert_eq!(
            decode(r#"40{"sid":"abc"}"#).unwrap(),
            Packet::Message(SocketPacket::Connect(Some(json!({"sid": "abc"}))))
        );
        assert_eq!(
            decode(r#"44{"message":"Not authorized"}"#).unwrap(),
            Packet::Message(SocketPacket::ConnectError("Not authorized".to_string()))
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode("").is_err());
        assert!(decode("9").is_err());
        assert!(decode("42[]").is_err());
    }
}
