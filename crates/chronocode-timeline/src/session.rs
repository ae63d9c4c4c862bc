//! Session export and import.
//!
//! A snapshot carries the whole event list, the whole checkpoint list and a
//! format version. The cursor is not stored: a restored store points at its
//! last event.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use chronocode_shared::constants::{SESSION_FORMAT_MAJOR, SESSION_FORMAT_VERSION};

use crate::error::{Result, TimelineError};
use crate::models::{Checkpoint, ReplayState, TimelineEvent};
use crate::store::TimelineStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default)]
    pub events: Vec<TimelineEvent>,
    #[serde(default)]
    pub checkpoints: Vec<Checkpoint>,
    /// Absent in hand-written blobs; always written on export.
    #[serde(default)]
    pub version: Option<String>,
}

impl SessionSnapshot {
    /// Decode and validate a session blob.
    pub fn parse(blob: &str) -> Result<Self> {
        let snapshot: SessionSnapshot =
            serde_json::from_str(blob).map_err(TimelineError::Malformed)?;

        if let Some(version) = &snapshot.version {
            if version.split('.').next() != Some(SESSION_FORMAT_MAJOR) {
                return Err(TimelineError::UnsupportedVersion(version.clone()));
            }
        }

        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(TimelineError::Encode)
    }
}

impl TimelineStore {
    /// Take a consistent snapshot of events and checkpoints.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().await;
        SessionSnapshot {
            events: state.events.clone(),
            checkpoints: state.checkpoints.clone(),
            version: Some(SESSION_FORMAT_VERSION.to_string()),
        }
    }

    /// Export the session as a JSON blob.
    pub async fn serialize(&self) -> Result<String> {
        self.snapshot().await.to_json()
    }

    /// Replace the whole log with the contents of a session blob.
    ///
    /// The blob is fully decoded before the store is touched, so a failure
    /// leaves the current events, checkpoints and cursor as they were.
    pub async fn restore(&self, blob: &str) -> Result<()> {
        let snapshot = match SessionSnapshot::parse(blob) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Rejected session blob");
                return Err(e);
            }
        };
        self.load(snapshot).await;
        Ok(())
    }

    /// Install an already-decoded snapshot.
    pub async fn load(&self, snapshot: SessionSnapshot) {
        let mut state = self.state.write().await;
        state.events = snapshot.events;
        state.checkpoints = snapshot.checkpoints;
        state.cursor = state.events.len().checked_sub(1);
        state.replay = ReplayState::default();

        info!(
            events = state.events.len(),
            checkpoints = state.checkpoints.len(),
            version = ?snapshot.version,
            "Restored session"
        );
    }
}
