use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChronoError {
    #[error("Codec error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
