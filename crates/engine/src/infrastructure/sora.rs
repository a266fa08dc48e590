//! OpenAI Sora video generation client.
//!
//! Same shape as the Veo client: create a video job, poll its status,
//! download the content once it completes.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use storyreel_domain::VideoArtifact;

use crate::ports::{VideoGenError, VideoGenPort, VideoRequest};

/// Client for the OpenAI videos API.
#[derive(Clone)]
pub struct OpenAiSoraClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiSoraClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    async fn create_job(&self, request: &VideoRequest) -> Result<String, VideoGenError> {
        if request.start_image.is_some() || request.end_image.is_some() {
            tracing::debug!(model = %request.model, "videos API takes no frame pins, dropping them");
        }
        let body = CreateVideoRequest {
            model: request.model.to_string(),
            prompt: request.prompt.clone(),
            size: request.aspect_ratio.as_deref().map(size_for),
            seconds: request.duration_seconds.map(|d| d.round() as u32),
        };

        let response = self
            .client
            .post(format!("{}/v1/videos", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| VideoGenError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(map_http_failure(status, error_text));
        }

        let job: VideoJob = response
            .json()
            .await
            .map_err(|e| VideoGenError::MalformedResponse(e.to_string()))?;
        Ok(job.id)
    }

    async fn wait_for_job(&self, job_id: &str) -> Result<(), VideoGenError> {
        const MAX_ATTEMPTS: u32 = 60;
        const POLL_INTERVAL: Duration = Duration::from_secs(5);

        for _ in 0..MAX_ATTEMPTS {
            let response = self
                .client
                .get(format!("{}/v1/videos/{}", self.base_url, job_id))
                .bearer_auth(&self.api_key)
                .send()
                .await
                .map_err(|e| VideoGenError::RequestFailed(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(map_http_failure(status, error_text));
            }

            let job: VideoJob = response
                .json()
                .await
                .map_err(|e| VideoGenError::MalformedResponse(e.to_string()))?;

            match job.status.as_str() {
                "completed" => return Ok(()),
                "failed" => {
                    let error = job.error.unwrap_or_else(|| JobError {
                        code: None,
                        message: "video job failed".to_string(),
                    });
                    return Err(map_job_failure(error));
                }
                // queued / in_progress
                _ => sleep(POLL_INTERVAL).await,
            }
        }

        Err(VideoGenError::Timeout(format!(
            "video job {job_id} did not finish in time"
        )))
    }

    async fn download(&self, job_id: &str) -> Result<Vec<u8>, VideoGenError> {
        let response = self
            .client
            .get(format!("{}/v1/videos/{}/content", self.base_url, job_id))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| VideoGenError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(VideoGenError::RequestFailed(format!(
                "video download failed with status {}",
                response.status()
            )));
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| VideoGenError::RequestFailed(e.to_string()))
    }
}

#[async_trait]
impl VideoGenPort for OpenAiSoraClient {
    async fn generate(&self, request: VideoRequest) -> Result<VideoArtifact, VideoGenError> {
        let job_id = self.create_job(&request).await?;
        tracing::debug!(model = %request.model, job_id = %job_id, "sora job created");

        self.wait_for_job(&job_id).await?;
        let data = self.download(&job_id).await?;

        Ok(VideoArtifact::from_bytes(data, "video/mp4"))
    }
}

/// The videos API takes pixel dimensions rather than an aspect ratio.
fn size_for(aspect_ratio: &str) -> String {
    match aspect_ratio {
        "9:16" => "720x1280".to_string(),
        _ => "1280x720".to_string(),
    }
}

fn map_http_failure(status: StatusCode, body: String) -> VideoGenError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => VideoGenError::Auth(body),
        StatusCode::TOO_MANY_REQUESTS => VideoGenError::Quota(body),
        _ => VideoGenError::RequestFailed(body),
    }
}

fn map_job_failure(error: JobError) -> VideoGenError {
    match error.code.as_deref() {
        Some("moderation_blocked") | Some("input_moderation") => VideoGenError::ContentPolicy {
            message: error.message,
            flagged_input: None,
        },
        _ => VideoGenError::RequestFailed(error.message),
    }
}

// =============================================================================
// Videos API types
// =============================================================================

#[derive(Debug, Serialize)]
struct CreateVideoRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seconds: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct VideoJob {
    id: String,
    status: String,
    error: Option<JobError>,
}

#[derive(Debug, Deserialize)]
struct JobError {
    code: Option<String>,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moderation_failures_map_to_content_policy() {
        let error = JobError {
            code: Some("moderation_blocked".to_string()),
            message: "prompt violates usage policies".to_string(),
        };
        assert!(matches!(
            map_job_failure(error),
            VideoGenError::ContentPolicy { .. }
        ));

        let other = JobError {
            code: Some("server_error".to_string()),
            message: "internal".to_string(),
        };
        assert!(matches!(
            map_job_failure(other),
            VideoGenError::RequestFailed(_)
        ));
    }

    #[test]
    fn aspect_ratios_translate_to_sizes() {
        assert_eq!(size_for("16:9"), "1280x720");
        assert_eq!(size_for("9:16"), "720x1280");
    }

    #[test]
    fn job_payload_deserializes() {
        let json = r#"{"id": "video_123", "status": "failed", "error": {"code": "moderation_blocked", "message": "flagged"}}"#;
        let job: VideoJob = serde_json::from_str(json).expect("deserialize");
        assert_eq!(job.id, "video_123");
        assert_eq!(job.status, "failed");
        assert!(job.error.is_some());
    }
}
