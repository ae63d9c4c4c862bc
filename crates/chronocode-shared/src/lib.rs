// Types shared by the timeline and presence engines.

pub mod clock;
pub mod constants;
pub mod error;
pub mod protocol;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::ChronoError;
pub use protocol::{PresenceKind, PresenceMessage};
pub use types::{CheckpointId, EventId, RoomId, SessionId, UserId, Vec3};
