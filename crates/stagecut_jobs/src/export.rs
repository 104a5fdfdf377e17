use serde::{Deserialize, Serialize};
use stagecut_core::units::{Px, HARD_LIMIT};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("timeline is {actual:.1}s long; exports are capped at {max:.0}s")]
    TooLong { actual: f64, max: f64 },

    #[error("nothing to export")]
    Empty,
}

/// An export submission: the serialized document plus output settings. The
/// composition itself happens service-side; this crate only validates and
/// tracks the job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportRequest {
    pub document: serde_json::Value,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

/// Progress update for the host's export dialog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExportProgress {
    pub percent: f64,
    pub frame: u64,
    pub eta_seconds: Option<f64>,
}

/// Exports are refused outright past the 3-minute timeline cap; the host
/// surfaces the message as a user-facing error.
pub fn validate_export_len(content_end: Px) -> Result<(), ExportError> {
    if content_end <= Px::ZERO {
        return Err(ExportError::Empty);
    }
    if content_end > HARD_LIMIT {
        return Err(ExportError::TooLong {
            actual: content_end.as_seconds(),
            max: HARD_LIMIT.as_seconds(),
        });
    }
    Ok(())
}
