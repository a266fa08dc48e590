//! Gemini Veo video generation client.
//!
//! Implements the VideoGenPort trait against the generative-language API's
//! long-running operation flow: submit, poll until done, download the
//! resulting video.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use storyreel_domain::{ImageData, VideoArtifact};

use crate::ports::{VideoGenError, VideoGenPort, VideoRequest};

/// Client for the Gemini Veo API.
#[derive(Clone)]
pub struct GeminiVeoClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GeminiVeoClient {
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

    /// Submit a generation request; returns the operation name to poll.
    async fn submit(&self, request: &VideoRequest) -> Result<String, VideoGenError> {
        let body = PredictRequest {
            instances: vec![PredictInstance {
                prompt: request.prompt.clone(),
                image: request.start_image.as_ref().map(InlineImage::from),
                last_frame: request.end_image.as_ref().map(InlineImage::from),
                reference_images: request
                    .reference_images
                    .iter()
                    .map(|image| ReferenceImagePayload {
                        image: InlineImage::from(image),
                    })
                    .collect(),
            }],
            parameters: PredictParameters {
                aspect_ratio: request.aspect_ratio.clone(),
                resolution: request.resolution.clone(),
                duration_seconds: request.duration_seconds,
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:predictLongRunning",
                self.base_url, request.model
            ))
            .query(&[("key", self.api_key.as_str())])
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

        let operation: OperationHandle = response
            .json()
            .await
            .map_err(|e| VideoGenError::MalformedResponse(e.to_string()))?;
        Ok(operation.name)
    }

    /// Poll the long-running operation until it settles.
    async fn wait_for_operation(&self, name: &str) -> Result<String, VideoGenError> {
        const MAX_ATTEMPTS: u32 = 60;
        const POLL_INTERVAL: Duration = Duration::from_secs(5);

        for _ in 0..MAX_ATTEMPTS {
            let response = self
                .client
                .get(format!("{}/v1beta/{}", self.base_url, name))
                .query(&[("key", self.api_key.as_str())])
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

            let operation: OperationStatus = response
                .json()
                .await
                .map_err(|e| VideoGenError::MalformedResponse(e.to_string()))?;

            if operation.done {
                if let Some(error) = operation.error {
                    return Err(VideoGenError::RequestFailed(error.message));
                }
                let generate = operation
                    .response
                    .and_then(|r| r.generate_video_response)
                    .ok_or_else(|| {
                        VideoGenError::MalformedResponse(
                            "operation finished without a video response".to_string(),
                        )
                    })?;

                if let Some(reasons) = generate.rai_media_filtered_reasons {
                    if !reasons.is_empty() {
                        return Err(VideoGenError::ContentPolicy {
                            message: reasons.join("; "),
                            flagged_input: None,
                        });
                    }
                }

                return generate
                    .generated_samples
                    .into_iter()
                    .next()
                    .map(|sample| sample.video.uri)
                    .ok_or_else(|| {
                        VideoGenError::MalformedResponse("no generated samples".to_string())
                    });
            }

            sleep(POLL_INTERVAL).await;
        }

        Err(VideoGenError::Timeout(
            "video operation did not finish in time".to_string(),
        ))
    }

    /// Download the generated video bytes.
    async fn download(&self, uri: &str) -> Result<Vec<u8>, VideoGenError> {
        let response = self
            .client
            .get(uri)
            .query(&[("key", self.api_key.as_str())])
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
impl VideoGenPort for GeminiVeoClient {
    async fn generate(&self, request: VideoRequest) -> Result<VideoArtifact, VideoGenError> {
        let operation = self.submit(&request).await?;
        tracing::debug!(model = %request.model, operation = %operation, "veo operation submitted");

        let uri = self.wait_for_operation(&operation).await?;
        let data = self.download(&uri).await?;

        Ok(VideoArtifact::from_bytes(data, "video/mp4").with_url(uri))
    }
}

fn map_http_failure(status: StatusCode, body: String) -> VideoGenError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => VideoGenError::Auth(body),
        StatusCode::TOO_MANY_REQUESTS => VideoGenError::Quota(body),
        StatusCode::BAD_REQUEST if body.contains("SAFETY") || body.contains("blocked") => {
            VideoGenError::ContentPolicy {
                message: body,
                flagged_input: None,
            }
        }
        _ => VideoGenError::RequestFailed(body),
    }
}

// =============================================================================
// Veo API types
// =============================================================================

#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictInstance {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<InlineImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_frame: Option<InlineImage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    reference_images: Vec<ReferenceImagePayload>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    aspect_ratio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_seconds: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineImage {
    bytes_base64_encoded: String,
    mime_type: String,
}

impl From<&ImageData> for InlineImage {
    fn from(image: &ImageData) -> Self {
        Self {
            bytes_base64_encoded: image.data.clone(),
            mime_type: image.media_type.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ReferenceImagePayload {
    image: InlineImage,
}

#[derive(Debug, Deserialize)]
struct OperationHandle {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OperationStatus {
    #[serde(default)]
    done: bool,
    response: Option<OperationResponse>,
    error: Option<OperationError>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
    rai_media_filtered_reasons: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    video: VideoHandle,
}

#[derive(Debug, Deserialize)]
struct VideoHandle {
    uri: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_and_quota_statuses_map_to_their_error_kinds() {
        assert!(matches!(
            map_http_failure(StatusCode::UNAUTHORIZED, "bad key".into()),
            VideoGenError::Auth(_)
        ));
        assert!(matches!(
            map_http_failure(StatusCode::TOO_MANY_REQUESTS, "slow down".into()),
            VideoGenError::Quota(_)
        ));
        assert!(matches!(
            map_http_failure(StatusCode::BAD_REQUEST, "prompt blocked by SAFETY".into()),
            VideoGenError::ContentPolicy { .. }
        ));
        assert!(matches!(
            map_http_failure(StatusCode::INTERNAL_SERVER_ERROR, "boom".into()),
            VideoGenError::RequestFailed(_)
        ));
    }

    #[test]
    fn filtered_operation_deserializes() {
        let json = r#"{
            "done": true,
            "response": {
                "generateVideoResponse": {
                    "generatedSamples": [],
                    "raiMediaFilteredReasons": ["violence"]
                }
            }
        }"#;
        let status: OperationStatus = serde_json::from_str(json).expect("deserialize");
        assert!(status.done);
        let reasons = status
            .response
            .and_then(|r| r.generate_video_response)
            .and_then(|g| g.rai_media_filtered_reasons)
            .expect("reasons");
        assert_eq!(reasons, vec!["violence".to_string()]);
    }
}
