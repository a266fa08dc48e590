//! Frame continuity - extracts and persists a generated scene's boundary
//! frames so the next scene can chain from them.

use std::sync::Arc;

use storyreel_domain::{FrameRefs, SceneId, VideoArtifact};

use crate::ports::{FrameExtractorPort, MediaStorePort};

/// Offset subtracted from the clip end so the last-frame grab never lands
/// past the final encoded frame.
pub const DEFAULT_FRAME_EPSILON_SECS: f64 = 0.1;

/// Extracts and persists the first/last frames of a committed generation.
pub struct FrameContinuityChain {
    extractor: Arc<dyn FrameExtractorPort>,
    media: Arc<dyn MediaStorePort>,
    epsilon_secs: f64,
}

impl FrameContinuityChain {
    pub fn new(extractor: Arc<dyn FrameExtractorPort>, media: Arc<dyn MediaStorePort>) -> Self {
        Self {
            extractor,
            media,
            epsilon_secs: DEFAULT_FRAME_EPSILON_SECS,
        }
    }

    pub fn with_epsilon(mut self, epsilon_secs: f64) -> Self {
        self.epsilon_secs = epsilon_secs;
        self
    }

    /// Extract and persist both boundary frames for a scene's chosen video.
    ///
    /// Returns `None` when extraction or persistence fails anywhere: the
    /// generation itself still counts as successful, but the scene carries no
    /// frames and the resolver's backward walk treats it as "not found, keep
    /// walking". There is never a partial single-frame outcome.
    pub async fn commit_frames(
        &self,
        scene_id: SceneId,
        duration_seconds: f64,
        artifact: &VideoArtifact,
    ) -> Option<FrameRefs> {
        let last_timestamp = (duration_seconds - self.epsilon_secs).max(0.0);

        let first_image = match self.extractor.extract(artifact, 0.0).await {
            Ok(image) => image,
            Err(error) => {
                tracing::warn!(%scene_id, %error, "first-frame extraction failed, clearing frames");
                return None;
            }
        };
        let last_image = match self.extractor.extract(artifact, last_timestamp).await {
            Ok(image) => image,
            Err(error) => {
                tracing::warn!(
                    %scene_id,
                    timestamp = last_timestamp,
                    %error,
                    "last-frame extraction failed, clearing frames"
                );
                return None;
            }
        };

        let first = match self.media.store_frame(scene_id, "first", &first_image).await {
            Ok(frame_ref) => frame_ref,
            Err(error) => {
                tracing::warn!(%scene_id, %error, "first-frame persist failed, clearing frames");
                return None;
            }
        };
        let last = match self.media.store_frame(scene_id, "last", &last_image).await {
            Ok(frame_ref) => frame_ref,
            Err(error) => {
                tracing::warn!(%scene_id, %error, "last-frame persist failed, clearing frames");
                return None;
            }
        };

        Some(FrameRefs::new(first, last))
    }
}
