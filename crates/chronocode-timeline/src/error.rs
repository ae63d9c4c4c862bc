use thiserror::Error;

/// Errors produced by the timeline layer.
///
/// Lookups never fail: unknown checkpoints and empty ranges yield empty
/// results. Only decoding foreign input can go wrong.
#[derive(Error, Debug)]
pub enum TimelineError {
    /// The session blob is not valid snapshot JSON.
    #[error("Malformed session data: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The session blob was written by an incompatible format version.
    #[error("Unsupported session format version: {0}")]
    UnsupportedVersion(String),

    /// Encoding the snapshot failed.
    #[error("Session encode error: {0}")]
    Encode(#[source] serde_json::Error),

    /// A producer notification could not be decoded.
    #[error("Invalid tool notification: {0}")]
    InvalidNotification(#[source] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TimelineError>;
