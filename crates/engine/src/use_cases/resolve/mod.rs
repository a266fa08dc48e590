//! Reference resolution - decides which images feed a video model.
//!
//! Resolution is a strict priority chain, implemented as an ordered list of
//! strategies evaluated until one matches:
//!
//! 1. Explicit asset attachments on the scene.
//! 2. The scene's explicit reference mode (continuity walk, numeric index,
//!    or direct asset).
//! 3. The legacy position-based default when no mode is set.
//!
//! Resolution never mutates state; given unchanged inputs it returns
//! identical output on every call.

mod strategies;

use std::sync::Arc;

use storyreel_domain::{Project, ReferenceImage, ResolvedReferences, Scene};

use crate::ports::{AssetStoreError, AssetStorePort, MediaStorePort};

/// Outcome of one resolution strategy: either a resolution, or a signal to
/// try the next strategy in the chain.
pub(crate) enum StrategyOutcome {
    Resolved(ResolvedReferences),
    NoMatch,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Scene 0 was asked to resolve in continuity mode. Callers must
    /// normalize the first scene to a numeric mode before resolving.
    #[error("scene 0 cannot resolve in continuity mode")]
    InvalidFirstScene,

    #[error("scene index {index} out of bounds ({len} scenes)")]
    SceneOutOfBounds { index: usize, len: usize },

    #[error(transparent)]
    AssetStore(#[from] AssetStoreError),
}

/// Computes the start frame and reference images for one scene.
pub struct ReferenceResolver {
    pub(crate) assets: Arc<dyn AssetStorePort>,
    pub(crate) media: Arc<dyn MediaStorePort>,
}

impl ReferenceResolver {
    pub fn new(assets: Arc<dyn AssetStorePort>, media: Arc<dyn MediaStorePort>) -> Self {
        Self { assets, media }
    }

    /// Resolve the input imagery for the scene at `scene_index`.
    pub async fn resolve(
        &self,
        project: &Project,
        scene_index: usize,
    ) -> Result<ResolvedReferences, ResolveError> {
        let scene = project
            .scene(scene_index)
            .ok_or(ResolveError::SceneOutOfBounds {
                index: scene_index,
                len: project.scenes.len(),
            })?;

        // Priority chain: first matching strategy wins, lower strategies are
        // not evaluated.
        if let StrategyOutcome::Resolved(resolved) = self.attached_assets(scene).await? {
            return Ok(resolved);
        }
        if let StrategyOutcome::Resolved(resolved) =
            self.explicit_mode(project, scene_index, scene).await?
        {
            return Ok(resolved);
        }
        self.legacy_default(project, scene_index).await
    }

    /// The project's available reference images: database-backed project
    /// assets take priority; legacy per-project character references are the
    /// fallback when the project has none.
    pub(crate) async fn available_references(
        &self,
        project: &Project,
    ) -> Result<Vec<ReferenceImage>, AssetStoreError> {
        let project_assets = self.assets.list_by_project(project.id).await?;
        if !project_assets.is_empty() {
            return Ok(project_assets
                .into_iter()
                .map(|asset| ReferenceImage::from_asset(asset.id, asset.image))
                .collect());
        }

        let mut legacy = Vec::with_capacity(project.character_reference_ids.len());
        for asset_id in &project.character_reference_ids {
            match self.assets.get(*asset_id).await? {
                Some(asset) => legacy.push(ReferenceImage::from_asset(asset.id, asset.image)),
                None => {
                    tracing::warn!(asset_id = %asset_id, "character reference missing, skipping");
                }
            }
        }
        Ok(legacy)
    }
}
