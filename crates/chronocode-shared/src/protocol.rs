use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ChronoError;
use crate::types::{RoomId, UserId};

/// Kinds of presence traffic a transport relays to room members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceKind {
    Join,
    Leave,
    Move,
    ToolCall,
    Chat,
    TaskAssign,
}

/// A message addressed to every member of one room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceMessage {
    pub kind: PresenceKind,
    pub user_id: UserId,
    pub room_id: RoomId,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Kind-specific body. Schema is up to the sender.
    #[serde(default)]
    pub data: Value,
}

// bincode cannot drive `deserialize_any`, so the free-form body travels as
// JSON text inside the binary frame.
#[derive(Serialize, Deserialize)]
struct WireForm {
    kind: PresenceKind,
    user_id: UserId,
    room_id: RoomId,
    timestamp: i64,
    data: String,
}

impl PresenceMessage {
    pub fn new(
        kind: PresenceKind,
        user_id: UserId,
        room_id: RoomId,
        timestamp: i64,
        data: Value,
    ) -> Self {
        Self {
            kind,
            user_id,
            room_id,
            timestamp,
            data,
        }
    }

    /// Serialize to binary (bincode)
    pub fn to_bytes(&self) -> Result<Vec<u8>, ChronoError> {
        let wire = WireForm {
            kind: self.kind,
            user_id: self.user_id.clone(),
            room_id: self.room_id,
            timestamp: self.timestamp,
            data: serde_json::to_string(&self.data)?,
        };
        Ok(bincode::serialize(&wire)?)
    }

    /// Deserialize from binary
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ChronoError> {
        let wire: WireForm = bincode::deserialize(bytes)?;
        Ok(Self {
            kind: wire.kind,
            user_id: wire.user_id,
            room_id: wire.room_id,
            timestamp: wire.timestamp,
            data: serde_json::from_str(&wire.data)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_move_message_survives_binary_frame() {
        let msg = PresenceMessage::new(
            PresenceKind::Move,
            UserId::from("u1"),
            RoomId::new(),
            1_700_000_000_000,
            json!({ "position": { "x": 1.0, "y": 2.0, "z": 3.0 } }),
        );

        let bytes = msg.to_bytes().unwrap();
        let restored = PresenceMessage::from_bytes(&bytes).unwrap();
        assert_eq!(restored, msg);
    }

    #[test]
    fn test_truncated_frame_is_rejected() {
        let msg = PresenceMessage::new(
            PresenceKind::Chat,
            UserId::from("u1"),
            RoomId::new(),
            0,
            json!("hello"),
        );
        let bytes = msg.to_bytes().unwrap();

        let err = PresenceMessage::from_bytes(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, ChronoError::Codec(_)));
    }

    #[test]
    fn test_kind_json_names() {
        assert_eq!(
            serde_json::to_string(&PresenceKind::TaskAssign).unwrap(),
            "\"task_assign\""
        );
    }
}
