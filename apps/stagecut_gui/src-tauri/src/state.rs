use crate::history::History;
use stagecut_core::document::Document;
use stagecut_core::timeline::TimelineController;
use stagecut_jobs::poll::CancelHandle;
use stagecut_jobs::JobId;
use std::sync::Mutex;

/// A generation or export job the host is currently polling.
pub struct ActiveJob {
    pub id: JobId,
    pub cancel: CancelHandle,
}

pub struct AppState {
    pub doc: Mutex<Document>,
    pub timeline: Mutex<TimelineController>,
    pub history: Mutex<History>,
    pub generation: Mutex<Option<ActiveJob>>,
}
