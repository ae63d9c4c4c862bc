//! # chronocode-presence
//!
//! Live roster of collaborators sharing a session.
//!
//! Rooms are created by a host, hold a bounded set of users with their scene
//! position, and disappear once their last member leaves or times out. Every
//! membership change is announced to a [`PresenceSink`] so a transport layer
//! can relay it.

pub mod avatar;
pub mod models;
pub mod registry;
pub mod sink;
pub mod sweeper;

pub use models::{Room, RoomSummary, User};
pub use registry::PresenceRegistry;
pub use sink::{ChannelSink, NullSink, PresenceSink};
pub use sweeper::spawn_sweeper;
