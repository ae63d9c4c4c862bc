//! Records held by the timeline store.
//!
//! Every struct derives `Serialize` and `Deserialize` so the full log can be
//! exported as a session snapshot and handed to replay consumers as-is.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use chronocode_shared::types::{CheckpointId, EventId, SessionId, Vec3};

// ---------------------------------------------------------------------------
// Event kinds and payloads
// ---------------------------------------------------------------------------

/// Coarse category of an event, used for display and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ToolCall,
    Response,
    Checkpoint,
    Error,
}

/// Kind-specific body of an event.
///
/// Producers vary, so every field beyond the essentials is optional and
/// tool arguments/results stay untyped JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EventPayload {
    ToolCall(ToolCallPayload),
    Response(ResponsePayload),
    Checkpoint(CheckpointPayload),
    Error(ErrorPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallPayload {
    pub tool: String,
    #[serde(default)]
    pub args: Value,
    /// Scene station the tool is drawn at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station: Option<String>,
    /// Spatial hint for the replay scene.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec3>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsePayload {
    pub tool: String,
    #[serde(default)]
    pub result: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckpointPayload {
    /// VCS commit this marker refers to. Only markers carrying one are
    /// indexed as checkpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    pub message: String,
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::ToolCall(_) => EventKind::ToolCall,
            EventPayload::Response(_) => EventKind::Response,
            EventPayload::Checkpoint(_) => EventKind::Checkpoint,
            EventPayload::Error(_) => EventKind::Error,
        }
    }

    /// Tool name, for the kinds that carry one.
    pub fn tool(&self) -> Option<&str> {
        match self {
            EventPayload::ToolCall(p) => Some(&p.tool),
            EventPayload::Response(p) => Some(&p.tool),
            EventPayload::Error(p) => p.tool.as_deref(),
            EventPayload::Checkpoint(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Timeline event
// ---------------------------------------------------------------------------

/// One appended occurrence. Never mutated once in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: EventId,
    /// Milliseconds since the Unix epoch, stamped by the store.
    pub timestamp: i64,
    pub session_id: SessionId,
    pub payload: EventPayload,
}

impl TimelineEvent {
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }
}

// ---------------------------------------------------------------------------
// Checkpoint
// ---------------------------------------------------------------------------

/// A commit marker anchored to a log position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: CheckpointId,
    pub timestamp: i64,
    pub commit_ref: String,
    pub branch: String,
    pub message: String,
    /// Index of the last event at creation time. `None` when the log was
    /// empty. Only meaningful against the log it was created in; a clear or
    /// restore starts a new log.
    pub event_index: Option<usize>,
}

// ---------------------------------------------------------------------------
// Read-side projections
// ---------------------------------------------------------------------------

/// Earliest and latest event timestamps; both zero for an empty log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineBounds {
    pub start: i64,
    pub end: i64,
}

/// Playback flag and speed multiplier for a replay driver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplayState {
    pub playing: bool,
    pub speed: f64,
}

impl Default for ReplayState {
    fn default() -> Self {
        Self {
            playing: false,
            speed: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_kind_and_tool() {
        let call = EventPayload::ToolCall(ToolCallPayload {
            tool: "grep".into(),
            args: json!({ "pattern": "fn main" }),
            station: None,
            position: None,
        });
        assert_eq!(call.kind(), EventKind::ToolCall);
        assert_eq!(call.tool(), Some("grep"));

        let marker = EventPayload::Checkpoint(CheckpointPayload::default());
        assert_eq!(marker.kind(), EventKind::Checkpoint);
        assert_eq!(marker.tool(), None);
    }

    #[test]
    fn test_payload_is_tagged_by_kind() {
        let payload = EventPayload::Error(ErrorPayload {
            tool: None,
            message: "boom".into(),
        });
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value, json!({ "type": "error", "data": { "message": "boom" } }));
    }

    #[test]
    fn test_loose_checkpoint_payload_parses() {
        let payload: EventPayload =
            serde_json::from_value(json!({ "type": "checkpoint", "data": {} })).unwrap();
        assert_eq!(payload, EventPayload::Checkpoint(CheckpointPayload::default()));
    }
}
