use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use chronocode_shared::clock::{Clock, SystemClock};
use chronocode_shared::constants::DEFAULT_BRANCH;
use chronocode_shared::types::{CheckpointId, EventId, SessionId};

use crate::models::{Checkpoint, EventPayload, ReplayState, TimelineBounds, TimelineEvent};

#[derive(Debug, Default)]
pub(crate) struct TimelineState {
    pub(crate) events: Vec<TimelineEvent>,
    pub(crate) checkpoints: Vec<Checkpoint>,
    /// Last event the consumer has observed. `None` only while the log is empty.
    pub(crate) cursor: Option<usize>,
    pub(crate) replay: ReplayState,
}

impl TimelineState {
    fn push_checkpoint(
        &mut self,
        timestamp: i64,
        commit_ref: String,
        branch: String,
        message: String,
    ) -> CheckpointId {
        let id = CheckpointId::new();
        let event_index = self.events.len().checked_sub(1);

        info!(
            checkpoint = %id,
            commit = %commit_ref,
            branch = %branch,
            event_index = ?event_index,
            "Created checkpoint"
        );

        self.checkpoints.push(Checkpoint {
            id,
            timestamp,
            commit_ref,
            branch,
            message,
            event_index,
        });
        id
    }

    /// Move the cursor to `index` and return the replay prefix ending there.
    fn seek(&mut self, index: usize) -> Vec<TimelineEvent> {
        self.cursor = Some(index);
        self.events[..=index].to_vec()
    }
}

/// Append-only event log with a navigation cursor.
///
/// Cloning yields another handle onto the same log. Appends and cursor moves
/// happen under one write lock, so every reader sees whole events and a
/// cursor that points into the log.
#[derive(Clone)]
pub struct TimelineStore {
    pub(crate) state: Arc<RwLock<TimelineState>>,
    clock: Arc<dyn Clock>,
}

impl TimelineStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(RwLock::new(TimelineState::default())),
            clock,
        }
    }

    // -- Recording --

    /// Append an event and advance the cursor onto it.
    ///
    /// A checkpoint payload carrying a commit reference also indexes a
    /// [`Checkpoint`] at the new event, within the same critical section.
    pub async fn record(
        &self,
        session_id: impl Into<SessionId>,
        payload: EventPayload,
    ) -> EventId {
        let session_id = session_id.into();
        let mut state = self.state.write().await;

        // Stamped under the lock so physical order and timestamp order agree.
        let timestamp = self.clock.now_millis();
        let id = EventId::new();
        let kind = payload.kind();

        let marker = match &payload {
            EventPayload::Checkpoint(cp) => cp.commit_ref.clone().map(|commit_ref| {
                (
                    commit_ref,
                    cp.branch.clone().unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
                    cp.message.clone().unwrap_or_default(),
                )
            }),
            _ => None,
        };

        state.events.push(TimelineEvent {
            id,
            timestamp,
            session_id,
            payload,
        });
        let index = state.events.len() - 1;
        state.cursor = Some(index);

        debug!(event = %id, kind = ?kind, index, timestamp, "Recorded event");

        if let Some((commit_ref, branch, message)) = marker {
            state.push_checkpoint(timestamp, commit_ref, branch, message);
        }

        id
    }

    /// Mark the current end of the log as a checkpoint.
    pub async fn checkpoint(
        &self,
        commit_ref: impl Into<String>,
        branch: impl Into<String>,
        message: impl Into<String>,
    ) -> CheckpointId {
        let mut state = self.state.write().await;
        let timestamp = self.clock.now_millis();
        state.push_checkpoint(timestamp, commit_ref.into(), branch.into(), message.into())
    }

    // -- Snapshots --

    pub async fn all_events(&self) -> Vec<TimelineEvent> {
        self.state.read().await.events.clone()
    }

    pub async fn checkpoints(&self) -> Vec<Checkpoint> {
        self.state.read().await.checkpoints.clone()
    }

    /// Events with `start <= timestamp <= end`, in log order.
    pub async fn events_in_range(&self, start: i64, end: i64) -> Vec<TimelineEvent> {
        self.state
            .read()
            .await
            .events
            .iter()
            .filter(|e| e.timestamp >= start && e.timestamp <= end)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.events.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.events.is_empty()
    }

    pub async fn bounds(&self) -> TimelineBounds {
        let state = self.state.read().await;
        match (state.events.first(), state.events.last()) {
            (Some(first), Some(last)) => TimelineBounds {
                start: first.timestamp,
                end: last.timestamp,
            },
            _ => TimelineBounds::default(),
        }
    }

    // -- Navigation --

    pub async fn current_index(&self) -> Option<usize> {
        self.state.read().await.cursor
    }

    pub async fn current_event(&self) -> Option<TimelineEvent> {
        let state = self.state.read().await;
        state.cursor.and_then(|i| state.events.get(i).cloned())
    }

    /// Seek to the first event at or after `timestamp`.
    ///
    /// Returns the log prefix up to and including that event. When every
    /// event is older the result is empty and the cursor stays put.
    pub async fn seek_to_time(&self, timestamp: i64) -> Vec<TimelineEvent> {
        let mut state = self.state.write().await;
        match state.events.iter().position(|e| e.timestamp >= timestamp) {
            Some(index) => {
                debug!(timestamp, index, "Seeked to time");
                state.seek(index)
            }
            None => Vec::new(),
        }
    }

    /// Seek to the event a checkpoint is anchored at.
    ///
    /// Unknown checkpoints, unanchored ones and anchors past the end of the
    /// current log yield an empty result and leave the cursor alone.
    pub async fn seek_to_checkpoint(&self, checkpoint_id: &CheckpointId) -> Vec<TimelineEvent> {
        let mut state = self.state.write().await;
        let index = state
            .checkpoints
            .iter()
            .find(|c| c.id == *checkpoint_id)
            .and_then(|c| c.event_index);

        match index {
            Some(index) if index < state.events.len() => {
                debug!(checkpoint = %checkpoint_id, index, "Seeked to checkpoint");
                state.seek(index)
            }
            _ => Vec::new(),
        }
    }

    pub async fn step_forward(&self) -> Option<TimelineEvent> {
        let mut state = self.state.write().await;
        let next = state.cursor.map_or(0, |c| c + 1);
        let event = state.events.get(next).cloned()?;
        state.cursor = Some(next);
        Some(event)
    }

    pub async fn step_backward(&self) -> Option<TimelineEvent> {
        let mut state = self.state.write().await;
        let prev = state.cursor?.checked_sub(1)?;
        let event = state.events.get(prev).cloned()?;
        state.cursor = Some(prev);
        Some(event)
    }

    // -- Scrubber support --

    /// Map a scrubber fraction (clamped to `[0, 1]`) onto the bounds.
    ///
    /// Computed in `f64` so restored logs spanning the whole `i64` range
    /// cannot overflow; the result saturates at the `i64` limits.
    pub async fn timestamp_at_fraction(&self, fraction: f64) -> i64 {
        let bounds = self.bounds().await;
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        let start = bounds.start as f64;
        let span = bounds.end as f64 - start;
        (start + span * fraction).round() as i64
    }

    /// Relative position of the cursor event within the bounds.
    pub async fn cursor_fraction(&self) -> Option<f64> {
        let state = self.state.read().await;
        let first = state.events.first()?.timestamp;
        let last = state.events.last()?.timestamp;
        if last == first {
            return None;
        }
        let current = state.events.get(state.cursor?)?.timestamp;
        Some((current as f64 - first as f64) / (last as f64 - first as f64))
    }

    // -- Replay control --

    /// Flag playback as running. Non-positive or non-finite speeds fall
    /// back to 1.0.
    pub async fn start_replay(&self, speed: f64) {
        let speed = if speed.is_finite() && speed > 0.0 { speed } else { 1.0 };
        let mut state = self.state.write().await;
        state.replay = ReplayState {
            playing: true,
            speed,
        };
        debug!(speed, cursor = ?state.cursor, "Replay started");
    }

    pub async fn stop_replay(&self) {
        self.state.write().await.replay.playing = false;
        debug!("Replay stopped");
    }

    pub async fn replay_state(&self) -> ReplayState {
        self.state.read().await.replay
    }

    /// Drop every event and checkpoint, unset the cursor and stop playback.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        let dropped = state.events.len();
        state.events.clear();
        state.checkpoints.clear();
        state.cursor = None;
        state.replay = ReplayState::default();
        info!(dropped, "Cleared timeline");
    }
}

impl Default for TimelineStore {
    fn default() -> Self {
        Self::new()
    }
}
