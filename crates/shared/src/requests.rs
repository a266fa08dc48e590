//! Request DTOs for the generation endpoints.

use serde::{Deserialize, Serialize};

/// An inline image on the wire: base64 payload plus MIME type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireImage {
    pub base64: String,
    pub mime_type: String,
}

/// Body of `POST /generate-video-multi`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiModelGenerateRequest {
    pub models: Vec<String>,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_images: Option<Vec<WireImage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_frame_data_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_frame_data_url: Option<String>,
}

/// Body of `POST /projects/{id}/scenes/{index}/generate`.
///
/// Models default to the project's configured default model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneGenerateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<Vec<String>>,
}

/// Body of `POST /projects/{id}/scenes/{index}/select`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectResultRequest {
    pub result_set_id: String,
    pub model: String,
}
