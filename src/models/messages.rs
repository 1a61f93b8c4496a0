use actix::Message;
use serde::{Deserialize, Serialize};

use crate::engine::Outcome;

/// Move coordinates as they cross the wire. The sender mirrors its own
/// coordinates (`7 - row`, `7 - col`) so they are already relative to the
/// receiving client's orientation; the receiver never needs to know the
/// sender's color.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WireMove {
    pub row_origin: u8,
    pub col_origin: u8,
    pub row_dest: u8,
    pub col_dest: u8,
}

/// Message sent from client to server.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClientMessage {
    pub message_type: String,
    pub room_id: Option<String>,
    pub player_name: Option<String>,
    /// Minutes per side, chosen at room creation.
    pub time_control: Option<u64>,
    #[serde(rename = "move")]
    pub game_move: Option<WireMove>,
    pub col: Option<u8>,
    pub piece_code: Option<String>,
    pub outcome: Option<Outcome>,
    pub message: Option<String>,
}

/// Message sent from server to client.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServerMessage {
    pub message_type: String,
    pub room_id: Option<String>,
    pub accepted: Option<bool>,
    /// Display names in join order; the creator plays White.
    pub players: Option<Vec<String>>,
    pub time_control: Option<u64>,
    #[serde(rename = "move")]
    pub game_move: Option<WireMove>,
    pub col: Option<u8>,
    pub piece_code: Option<String>,
    pub outcome: Option<Outcome>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ServerMessage {
    pub fn new(message_type: &str) -> Self {
        Self {
            message_type: message_type.to_string(),
            ..Self::default()
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            message_type: "error".to_string(),
            error: Some(text.into()),
            ..Self::default()
        }
    }

    /// Pass a client payload through to the peer untouched. The relay
    /// inspects nothing beyond the message type; it never validates moves.
    pub fn relay(msg: &ClientMessage) -> Self {
        Self {
            message_type: msg.message_type.clone(),
            room_id: msg.room_id.clone(),
            game_move: msg.game_move,
            col: msg.col,
            piece_code: msg.piece_code.clone(),
            outcome: msg.outcome,
            message: msg.message.clone(),
            ..Self::default()
        }
    }
}

/// Raw text frame forwarded to a session actor.
#[derive(Message)]
#[rtype(result = "()")]
pub struct RelayText(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_move_uses_camel_case_fields() {
        let msg = ClientMessage {
            message_type: "move".to_string(),
            room_id: Some("lobby".to_string()),
            game_move: Some(WireMove {
                row_origin: 1,
                col_origin: 3,
                row_dest: 3,
                col_dest: 3,
            }),
            ..ClientMessage::default()
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"messageType\":\"move\""));
        assert!(json.contains("\"rowOrigin\":1"));
        assert!(json.contains("\"colDest\":3"));
    }

    #[test]
    fn test_relay_copies_payload_and_drops_server_fields() {
        let msg = ClientMessage {
            message_type: "promoted".to_string(),
            room_id: Some("lobby".to_string()),
            col: Some(6),
            piece_code: Some("q".to_string()),
            ..ClientMessage::default()
        };
        let relayed = ServerMessage::relay(&msg);
        assert_eq!(relayed.message_type, "promoted");
        assert_eq!(relayed.col, Some(6));
        assert_eq!(relayed.piece_code.as_deref(), Some("q"));
        assert_eq!(relayed.accepted, None);
        assert_eq!(relayed.players, None);
    }
}
