use chronocode_timeline::TimelineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Input error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timeline error: {0}")]
    Timeline(#[from] TimelineError),
}
