use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("job timed out")]
    TimedOut,

    #[error("job canceled")]
    Canceled,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, JobError>;
