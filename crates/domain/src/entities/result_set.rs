//! Per-model generation outcomes pending selection.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ResultSetId, SceneId};
use crate::value_objects::ModelId;

/// Category of a per-model generation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GenerationErrorKind {
    /// Vendor rejected the prompt or an input image on content policy grounds.
    ContentPolicy,
    Timeout,
    Auth,
    Quota,
    /// Vendor responded but the payload could not be interpreted.
    MalformedResponse,
    RequestFailed,
}

/// Structured error descriptor for one model's failed attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationError {
    pub kind: GenerationErrorKind,
    pub message: String,
    /// Which input the vendor flagged, when the failure is a policy rejection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flagged_input: Option<String>,
}

impl GenerationError {
    pub fn new(kind: GenerationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            flagged_input: None,
        }
    }

    pub fn with_flagged_input(mut self, input: impl Into<String>) -> Self {
        self.flagged_input = Some(input.into());
        self
    }
}

impl std::fmt::Display for GenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// A generated video: binary payload and/or an addressable pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoArtifact {
    /// Vendor-hosted URL, when the vendor returns one.
    pub url: Option<String>,
    /// Raw video bytes, when downloaded.
    pub data: Option<Vec<u8>>,
    pub mime_type: String,
}

impl VideoArtifact {
    pub fn from_url(url: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            data: None,
            mime_type: mime_type.into(),
        }
    }

    pub fn from_bytes(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            url: None,
            data: Some(data),
            mime_type: mime_type.into(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// One model's outcome for one generation attempt.
#[derive(Debug, Clone)]
pub struct VideoGenerationResult {
    pub model: ModelId,
    pub outcome: Result<VideoArtifact, GenerationError>,
    /// Wall-clock from dispatch to settle. Display only - never used for
    /// ordering or tie-breaking.
    pub elapsed: Duration,
}

impl VideoGenerationResult {
    pub fn success(model: ModelId, artifact: VideoArtifact, elapsed: Duration) -> Self {
        Self {
            model,
            outcome: Ok(artifact),
            elapsed,
        }
    }

    pub fn failure(model: ModelId, error: GenerationError, elapsed: Duration) -> Self {
        Self {
            model,
            outcome: Err(error),
            elapsed,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn artifact(&self) -> Option<&VideoArtifact> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&GenerationError> {
        self.outcome.as_ref().err()
    }
}

/// The set of per-model outcomes from one multi-model generation request.
///
/// Transient: destroyed the moment a choice is committed. Unselected
/// artifacts are not retained.
#[derive(Debug, Clone)]
pub struct ResultSet {
    pub id: ResultSetId,
    pub scene_id: SceneId,
    pub results: Vec<VideoGenerationResult>,
    pub created_at: DateTime<Utc>,
}

impl ResultSet {
    pub fn new(scene_id: SceneId, results: Vec<VideoGenerationResult>) -> Self {
        Self {
            id: ResultSetId::new(),
            scene_id,
            results,
            created_at: Utc::now(),
        }
    }

    pub fn get(&self, model: &ModelId) -> Option<&VideoGenerationResult> {
        self.results.iter().find(|r| &r.model == model)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// The sole result, when exactly one model was requested.
    ///
    /// Used by the single-model fast path that bypasses explicit selection.
    pub fn sole_result(&self) -> Option<&VideoGenerationResult> {
        match self.results.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}
