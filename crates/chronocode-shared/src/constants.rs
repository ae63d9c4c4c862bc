/// Application name
pub const APP_NAME: &str = "ChronoCode";

/// Version tag written into every exported session blob
pub const SESSION_FORMAT_VERSION: &str = "1.0.0";

/// Major component of [`SESSION_FORMAT_VERSION`] accepted on restore
pub const SESSION_FORMAT_MAJOR: &str = "1";

/// Session id applied when a producer omits one
pub const DEFAULT_SESSION_ID: &str = "default";

/// Tool name applied when a producer omits one
pub const UNKNOWN_TOOL: &str = "unknown";

/// Branch recorded on auto-created checkpoints that name none
pub const DEFAULT_BRANCH: &str = "main";

/// Station for tools missing from the station table
pub const DEFAULT_STATION: &str = "center";

/// Default room capacity
pub const DEFAULT_MAX_USERS: usize = 8;

/// Presence liveness timeout in milliseconds
pub const DEFAULT_INACTIVITY_TIMEOUT_MS: i64 = 30_000;

/// Interval between inactivity sweeps in seconds
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 10;

/// Capacity of the presence broadcast channel
pub const PRESENCE_CHANNEL_CAPACITY: usize = 256;

/// Maximum number of characters in a generated avatar label
pub const AVATAR_LABEL_LEN: usize = 2;

/// Collaborator colours, handed out round-robin across all rooms.
pub const USER_COLORS: [&str; 8] = [
    "#ef4444", // red
    "#3b82f6", // blue
    "#10b981", // green
    "#f59e0b", // amber
    "#8b5cf6", // purple
    "#ec4899", // pink
    "#06b6d4", // cyan
    "#f97316", // orange
];
