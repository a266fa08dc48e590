//! Scene entity - one shot in a video story.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::SceneId;
use crate::value_objects::{AttachedAsset, FrameRef, FrameRefs, ReferenceMode};

/// Quality-score record for a generated scene.
///
/// Cleared whenever the underlying video changes - an evaluation is
/// meaningless once the artifact it scored is gone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub score: f32,
    pub notes: Option<String>,
    pub evaluated_at: DateTime<Utc>,
}

/// One shot in the story.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: SceneId,
    pub prompt: String,
    pub voiceover_text: Option<String>,
    pub camera_angle: Option<String>,
    pub duration_seconds: f64,
    /// How this scene picks its starting imagery. `None` means the legacy
    /// position-based default applies.
    pub reference_mode: Option<ReferenceMode>,
    /// Explicit, highest-priority override of which images to use.
    pub attached_assets: Vec<AttachedAsset>,
    pub first_frame_ref: Option<FrameRef>,
    pub last_frame_ref: Option<FrameRef>,
    pub generated: bool,
    /// Pointer to the current chosen video artifact.
    pub video_ref: Option<String>,
    pub evaluation: Option<Evaluation>,
}

impl Scene {
    pub fn new(prompt: impl Into<String>, duration_seconds: f64) -> Self {
        Self {
            id: SceneId::new(),
            prompt: prompt.into(),
            voiceover_text: None,
            camera_angle: None,
            duration_seconds,
            reference_mode: None,
            attached_assets: Vec::new(),
            first_frame_ref: None,
            last_frame_ref: None,
            generated: false,
            video_ref: None,
            evaluation: None,
        }
    }

    pub fn with_reference_mode(mut self, mode: ReferenceMode) -> Self {
        self.reference_mode = Some(mode);
        self
    }

    pub fn with_attached_assets(mut self, assets: Vec<AttachedAsset>) -> Self {
        self.attached_assets = assets;
        self
    }

    /// Attachments sorted by their configured order.
    pub fn ordered_attachments(&self) -> Vec<&AttachedAsset> {
        let mut attachments: Vec<&AttachedAsset> = self.attached_assets.iter().collect();
        attachments.sort_by_key(|a| a.order);
        attachments
    }

    /// Record a committed generation result.
    ///
    /// Overwrites (never appends) the frame refs; a `None` pair means frame
    /// extraction failed and both refs are cleared while the generation
    /// itself still counts as successful. Any prior evaluation is dropped.
    pub fn commit_generation(&mut self, video_ref: impl Into<String>, frames: Option<FrameRefs>) {
        self.video_ref = Some(video_ref.into());
        self.generated = true;
        match frames {
            Some(FrameRefs { first, last }) => {
                self.first_frame_ref = Some(first);
                self.last_frame_ref = Some(last);
            }
            None => {
                self.first_frame_ref = None;
                self.last_frame_ref = None;
            }
        }
        self.evaluation = None;
    }

    /// Whether this scene has a stored frame a later scene can continue from.
    pub fn has_continuity_frame(&self) -> bool {
        self.generated && self.last_frame_ref.is_some()
    }

    /// Structural validation, checked before a scene is persisted.
    pub fn validate(&self) -> Result<(), crate::DomainError> {
        if self.prompt.trim().is_empty() {
            return Err(crate::DomainError::validation("scene prompt must not be empty"));
        }
        if !self.duration_seconds.is_finite() || self.duration_seconds <= 0.0 {
            return Err(crate::DomainError::validation(
                "scene duration must be a positive number of seconds",
            ));
        }
        if let Some(ReferenceMode::Index(0)) = self.reference_mode {
            return Err(crate::DomainError::constraint(
                "reference index is 1-based, 0 is not a valid index",
            ));
        }
        Ok(())
    }
}
