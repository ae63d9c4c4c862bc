//! # chronocode-timeline
//!
//! In-memory event timeline for agent sessions.
//!
//! Producers append tool calls, responses, checkpoints and errors to a
//! [`TimelineStore`]; replay consumers read it back through temporal queries
//! (range, seek-to-time, seek-to-checkpoint, single steps) that move a shared
//! cursor. The whole log round-trips through a versioned JSON snapshot.

pub mod models;
pub mod producer;
pub mod session;
pub mod store;

mod error;

pub use error::{Result, TimelineError};
pub use models::*;
pub use producer::{station_for_tool, TimelineRecorder, ToolNotification, ToolPhase};
pub use session::SessionSnapshot;
pub use store::TimelineStore;
