//! Response DTOs for the generation endpoints.

use serde::{Deserialize, Serialize};
use storyreel_domain::{GenerationError, GenerationErrorKind};

/// Structured per-model error on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireGenerationError {
    pub kind: GenerationErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flagged_input: Option<String>,
}

impl From<GenerationError> for WireGenerationError {
    fn from(error: GenerationError) -> Self {
        Self {
            kind: error.kind,
            message: error.message,
            flagged_input: error.flagged_input,
        }
    }
}

/// One model's entry in a multi-model response.
///
/// Entries are positionally aligned 1:1 with the requested model ids even on
/// partial failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelResult {
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Base64-encoded video payload, when the vendor returned raw bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_bytes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<WireGenerationError>,
    /// Wall-clock milliseconds from dispatch to settle, for display.
    pub elapsed_ms: u64,
}

/// Body of a 200 response from `POST /generate-video-multi`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiModelGenerateResponse {
    pub results: Vec<ModelResult>,
}

/// Body of a 200 response from the scene-scoped generate endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneGenerateResponse {
    pub result_set_id: String,
    pub results: Vec<ModelResult>,
    /// Set when the single-model fast path committed the sole result.
    pub auto_committed: bool,
}

/// Error body for rejected requests; lists the valid model set when the
/// rejection was an unrecognized model id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_models: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_failure_keeps_positional_alignment() {
        let response = MultiModelGenerateResponse {
            results: vec![
                ModelResult {
                    model: "veo-3.1".to_string(),
                    video_url: Some("https://cdn.example/a.mp4".to_string()),
                    video_bytes: None,
                    mime_type: Some("video/mp4".to_string()),
                    error: None,
                    elapsed_ms: 5120,
                },
                ModelResult {
                    model: "sora-turbo".to_string(),
                    video_url: None,
                    video_bytes: None,
                    mime_type: None,
                    error: Some(WireGenerationError {
                        kind: GenerationErrorKind::ContentPolicy,
                        message: "input flagged".to_string(),
                        flagged_input: Some("prompt".to_string()),
                    }),
                    elapsed_ms: 402,
                },
            ],
        };

        let json = serde_json::to_value(&response).expect("serialize");
        let results = json["results"].as_array().expect("results array");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["model"], "veo-3.1");
        assert!(results[0].get("error").is_none());
        assert_eq!(results[1]["error"]["kind"], "contentPolicy");
        assert!(results[1].get("videoUrl").is_none());
    }
}
