//! External-collaborator plumbing for the editor: AI generation and export
//! run as remote jobs that the host submits and polls. The drag engine never
//! sees any of this; the only coupling is the 3-minute export cap shared
//! through `stagecut_core::units`.

use base64::Engine;
use serde::{Deserialize, Serialize};

pub mod error;
pub mod export;
pub mod poll;

pub use error::{JobError, Result};

// ---------------------------------------------------------------------------
// Job identity & status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct JobId(pub String);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed(String),
    Canceled,
    TimedOut,
}

impl JobStatus {
    /// A settled job will never change status again.
    pub fn is_settled(&self) -> bool {
        !matches!(self, JobStatus::Queued | JobStatus::Running)
    }
}

/// One status poll's worth of information.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusReport {
    pub status: JobStatus,
    pub output: Option<GenerationOutput>,
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// A named base64 blob moving to or from the generation service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaPayload {
    pub name: String,
    pub data: String,
}

impl MediaPayload {
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            name: name.into(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    /// Tolerant decode: strips a `data:` URL prefix and repairs missing
    /// padding before decoding, since services are sloppy about both.
    pub fn decode(&self) -> Result<Vec<u8>> {
        let mut data = match self.data.split_once(',') {
            Some((prefix, rest)) if prefix.starts_with("data:") => rest.to_string(),
            _ => self.data.clone(),
        };
        let missing = data.len() % 4;
        if missing != 0 {
            data.push_str(&"=".repeat(4 - missing));
        }
        base64::engine::general_purpose::STANDARD
            .decode(data.as_bytes())
            .map_err(|e| JobError::InvalidPayload(e.to_string()))
    }
}

/// What the host sends to start an AI video generation: the workflow graph,
/// the chosen effect, and the source images.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationRequest {
    pub effect: String,
    pub workflow: serde_json::Value,
    pub images: Vec<MediaPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationOutput {
    pub videos: Vec<MediaPayload>,
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// The remote service boundary: submit returns a job id, status reports on
/// it. Implementations live with the host; tests script one.
pub trait JobBackend {
    fn submit(
        &self,
        request: &GenerationRequest,
    ) -> impl std::future::Future<Output = Result<JobId>> + Send;

    fn status(&self, id: &JobId) -> impl std::future::Future<Output = Result<StatusReport>> + Send;
}
