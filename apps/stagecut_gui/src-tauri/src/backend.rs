use stagecut_jobs::{
    GenerationOutput, GenerationRequest, JobBackend, JobError, JobId, JobStatus, MediaPayload,
    Result, StatusReport,
};

/// RunPod-style serverless backend: POST the workflow to `/run`, then GET
/// `/status/{id}` until the job settles. HTTP runs on the blocking pool so
/// command handlers stay async.
pub struct RunpodBackend {
    api_key: String,
    endpoint_id: String,
}

impl RunpodBackend {
    /// Credentials come from the environment; no generation features are
    /// offered without them.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("STAGECUT_API_KEY").ok()?;
        let endpoint_id = std::env::var("STAGECUT_ENDPOINT_ID").ok()?;
        if api_key.is_empty() || endpoint_id.is_empty() {
            return None;
        }
        Some(Self {
            api_key,
            endpoint_id,
        })
    }

    fn run_url(&self) -> String {
        format!("https://api.runpod.ai/v2/{}/run", self.endpoint_id)
    }

    fn status_url(&self, id: &JobId) -> String {
        format!("https://api.runpod.ai/v2/{}/status/{}", self.endpoint_id, id)
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.api_key)
    }
}

impl JobBackend for RunpodBackend {
    async fn submit(&self, request: &GenerationRequest) -> Result<JobId> {
        let url = self.run_url();
        let auth = self.auth_header();
        let body = serde_json::json!({
            "input": {
                "workflow": request.workflow,
                "effect": request.effect,
                "images": request.images,
            }
        });

        let response = tokio::task::spawn_blocking(move || {
            ureq::post(&url)
                .set("Authorization", &auth)
                .set("Content-Type", "application/json")
                .send_json(body)
                .map_err(|e| JobError::Backend(e.to_string()))?
                .into_json::<serde_json::Value>()
                .map_err(|e| JobError::Backend(e.to_string()))
        })
        .await
        .map_err(|e| JobError::Backend(e.to_string()))??;

        match response.get("id").and_then(|v| v.as_str()) {
            Some(id) => Ok(JobId(id.to_string())),
            None => Err(JobError::Backend(format!(
                "no job id in response: {response}"
            ))),
        }
    }

    async fn status(&self, id: &JobId) -> Result<StatusReport> {
        let url = self.status_url(id);
        let auth = self.auth_header();

        let response = tokio::task::spawn_blocking(move || {
            ureq::get(&url)
                .set("Authorization", &auth)
                .call()
                .map_err(|e| JobError::Backend(e.to_string()))?
                .into_json::<serde_json::Value>()
                .map_err(|e| JobError::Backend(e.to_string()))
        })
        .await
        .map_err(|e| JobError::Backend(e.to_string()))??;

        Ok(parse_status(&response))
    }
}

fn parse_status(response: &serde_json::Value) -> StatusReport {
    let status = match response.get("status").and_then(|v| v.as_str()) {
        Some("IN_QUEUE") => JobStatus::Queued,
        Some("IN_PROGRESS") => JobStatus::Running,
        Some("COMPLETED") => JobStatus::Completed,
        Some("CANCELLED") => JobStatus::Canceled,
        Some("TIMED_OUT") => JobStatus::TimedOut,
        Some("FAILED") => {
            let message = response
                .get("error")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error");
            JobStatus::Failed(message.to_string())
        }
        // Unknown states keep the poll alive, matching the service's
        // documented behavior of introducing transitional states.
        _ => JobStatus::Running,
    };

    let output = (status == JobStatus::Completed)
        .then(|| parse_output(response.get("output")))
        .flatten();

    StatusReport { status, output }
}

fn parse_output(output: Option<&serde_json::Value>) -> Option<GenerationOutput> {
    let output = output?;
    let items = output
        .get("videos")
        .or_else(|| output.get("images"))?
        .as_array()?;

    let videos = items
        .iter()
        .filter_map(|item| {
            let data = item.get("data").and_then(|v| v.as_str())?;
            let name = item
                .get("path")
                .or_else(|| item.get("name"))
                .and_then(|v| v.as_str())
                .unwrap_or("output.mp4");
            Some(MediaPayload {
                name: name.to_string(),
                data: data.to_string(),
            })
        })
        .collect();

    Some(GenerationOutput { videos })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_completed_with_videos() {
        let response = serde_json::json!({
            "status": "COMPLETED",
            "output": {
                "videos": [
                    {"path": "results/out.mp4", "data": "aGVsbG8="}
                ]
            }
        });
        let report = parse_status(&response);
        assert_eq!(report.status, JobStatus::Completed);
        let output = report.output.unwrap();
        assert_eq!(output.videos.len(), 1);
        assert_eq!(output.videos[0].name, "results/out.mp4");
        assert_eq!(output.videos[0].decode().unwrap(), b"hello");
    }

    #[test]
    fn parses_failed_with_message() {
        let response = serde_json::json!({"status": "FAILED", "error": "worker crashed"});
        let report = parse_status(&response);
        assert_eq!(report.status, JobStatus::Failed("worker crashed".into()));
        assert!(report.output.is_none());
    }

    #[test]
    fn unknown_status_keeps_polling() {
        let response = serde_json::json!({"status": "WARMING_UP"});
        assert_eq!(parse_status(&response).status, JobStatus::Running);
    }

    #[test]
    fn legacy_images_key_is_accepted() {
        let response = serde_json::json!({
            "status": "COMPLETED",
            "output": {"images": [{"name": "a.png", "data": "YQ=="}]}
        });
        let output = parse_status(&response).output.unwrap();
        assert_eq!(output.videos[0].name, "a.png");
    }
}
