use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Clip not found: {0}")]
    ClipNotFound(uuid::Uuid),

    #[error("Lane limit reached")]
    LaneLimitReached,

    #[error("Lane cannot be removed: {0}")]
    LaneNotRemovable(&'static str),

    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
