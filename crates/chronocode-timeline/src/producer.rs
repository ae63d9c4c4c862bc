//! Adapter between the tool-execution pipeline and the timeline.
//!
//! The pipeline emits a notification before and after every tool call.
//! Each one arrives as a [`ToolNotification`] (typically one JSON line) and
//! becomes a `ToolCall` or `Response` event.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use chronocode_shared::constants::{DEFAULT_SESSION_ID, DEFAULT_STATION, UNKNOWN_TOOL};
use chronocode_shared::types::{EventId, SessionId};

use crate::error::{Result, TimelineError};
use crate::models::{EventPayload, ResponsePayload, ToolCallPayload};
use crate::store::TimelineStore;

/// Which side of the tool call a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolPhase {
    #[serde(alias = "pre_tool_use")]
    Pre,
    #[serde(alias = "post_tool_use")]
    Post,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolNotification {
    pub phase: ToolPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    /// Tool input (pre phase).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,
    /// Tool output (post phase).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

/// Scene station a tool is drawn at. Display only.
pub fn station_for_tool(tool: &str) -> &'static str {
    match tool {
        "read_file" => "bookshelf",
        "write_file" => "desk",
        "edit_file" => "workbench",
        "execute_bash" => "terminal",
        "grep" | "glob" => "scanner",
        "web_fetch" | "web_search" => "antenna",
        "use_subagent" => "portal",
        "todo_write" => "taskboard",
        _ => DEFAULT_STATION,
    }
}

impl ToolNotification {
    /// Build the event payload this notification records.
    pub fn to_payload(&self) -> EventPayload {
        let tool = self
            .tool
            .clone()
            .unwrap_or_else(|| UNKNOWN_TOOL.to_string());

        match self.phase {
            ToolPhase::Pre => EventPayload::ToolCall(ToolCallPayload {
                station: Some(station_for_tool(&tool).to_string()),
                args: self
                    .args
                    .clone()
                    .unwrap_or_else(|| Value::Object(Default::default())),
                tool,
                position: None,
            }),
            ToolPhase::Post => EventPayload::Response(ResponsePayload {
                tool,
                result: self.result.clone().unwrap_or(Value::Null),
            }),
        }
    }
}

/// Feeds producer notifications into a [`TimelineStore`].
#[derive(Clone)]
pub struct TimelineRecorder {
    store: TimelineStore,
    default_session: SessionId,
}

impl TimelineRecorder {
    pub fn new(store: TimelineStore) -> Self {
        Self {
            store,
            default_session: SessionId::from(DEFAULT_SESSION_ID),
        }
    }

    /// Session applied to notifications that carry none.
    pub fn with_default_session(mut self, session: impl Into<SessionId>) -> Self {
        self.default_session = session.into();
        self
    }

    pub fn store(&self) -> &TimelineStore {
        &self.store
    }

    pub async fn ingest(&self, notification: &ToolNotification) -> EventId {
        let session = notification
            .session_id
            .as_deref()
            .map(SessionId::from)
            .unwrap_or_else(|| self.default_session.clone());
        let payload = notification.to_payload();

        debug!(
            session = %session,
            phase = ?notification.phase,
            tool = payload.tool().unwrap_or(UNKNOWN_TOOL),
            "Ingesting tool notification"
        );

        self.store.record(session, payload).await
    }

    /// Decode one JSON line and record it.
    pub async fn ingest_line(&self, line: &str) -> Result<EventId> {
        let notification: ToolNotification =
            serde_json::from_str(line).map_err(TimelineError::InvalidNotification)?;
        Ok(self.ingest(&notification).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventKind;
    use serde_json::json;

    #[test]
    fn test_station_table() {
        assert_eq!(station_for_tool("read_file"), "bookshelf");
        assert_eq!(station_for_tool("glob"), "scanner");
        assert_eq!(station_for_tool("web_search"), "antenna");
        assert_eq!(station_for_tool("todo_write"), "taskboard");
        assert_eq!(station_for_tool("teleport"), "center");
        assert_eq!(station_for_tool(""), "center");
    }

    #[tokio::test]
    async fn test_pre_and_post_notifications() {
        let recorder = TimelineRecorder::new(TimelineStore::new());

        recorder
            .ingest(&ToolNotification {
                phase: ToolPhase::Pre,
                session_id: Some("s1".into()),
                tool: Some("execute_bash".into()),
                args: Some(json!({ "command": "ls" })),
                result: None,
            })
            .await;
        recorder
            .ingest(&ToolNotification {
                phase: ToolPhase::Post,
                session_id: Some("s1".into()),
                tool: Some("execute_bash".into()),
                args: None,
                result: Some(json!("Cargo.toml")),
            })
            .await;

        let events = recorder.store().all_events().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind(), EventKind::ToolCall);
        assert_eq!(events[1].kind(), EventKind::Response);

        match &events[0].payload {
            EventPayload::ToolCall(call) => {
                assert_eq!(call.station.as_deref(), Some("terminal"));
                assert_eq!(call.args, json!({ "command": "ls" }));
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_fields_fall_back() {
        let recorder =
            TimelineRecorder::new(TimelineStore::new()).with_default_session("fallback");

        recorder.ingest_line(r#"{"phase":"pre_tool_use"}"#).await.unwrap();

        let event = &recorder.store().all_events().await[0];
        assert_eq!(event.session_id.as_str(), "fallback");
        match &event.payload {
            EventPayload::ToolCall(call) => {
                assert_eq!(call.tool, "unknown");
                assert_eq!(call.args, json!({}));
                assert_eq!(call.station.as_deref(), Some("center"));
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_default_session_name() {
        let recorder = TimelineRecorder::new(TimelineStore::new());
        recorder
            .ingest_line(r#"{"phase":"post","tool":"grep"}"#)
            .await
            .unwrap();
        let event = &recorder.store().all_events().await[0];
        assert_eq!(event.session_id.as_str(), "default");
    }

    #[tokio::test]
    async fn test_invalid_line_is_rejected() {
        let recorder = TimelineRecorder::new(TimelineStore::new());

        let err = recorder.ingest_line(r#"{"phase":"sideways"}"#).await.unwrap_err();
        assert!(matches!(err, TimelineError::InvalidNotification(_)));
        assert!(recorder.store().is_empty().await);
    }
}
