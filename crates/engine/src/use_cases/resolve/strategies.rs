//! The ordered resolution strategies and the backward continuity walk.

use storyreel_domain::{
    Project, ReferenceImage, ReferenceMode, ResolvedReferences, Scene,
};

use super::{ReferenceResolver, ResolveError, StrategyOutcome};
use crate::ports::AssetStoreError;

impl ReferenceResolver {
    /// Strategy 1: explicit attachments override everything.
    ///
    /// Unresolvable ids are skipped, not fatal. A sole surviving attachment
    /// is also promoted to the literal start frame; two or more are style
    /// references only.
    pub(crate) async fn attached_assets(
        &self,
        scene: &Scene,
    ) -> Result<StrategyOutcome, ResolveError> {
        if scene.attached_assets.is_empty() {
            return Ok(StrategyOutcome::NoMatch);
        }

        let mut loaded = Vec::with_capacity(scene.attached_assets.len());
        for attachment in scene.ordered_attachments() {
            match self.assets.get(attachment.asset_id).await? {
                Some(asset) => loaded.push(ReferenceImage::from_asset(asset.id, asset.image)),
                None => {
                    tracing::warn!(
                        asset_id = %attachment.asset_id,
                        scene_id = %scene.id,
                        "attached asset missing, skipping"
                    );
                }
            }
        }

        let resolved = match loaded.as_slice() {
            [] => {
                tracing::warn!(scene_id = %scene.id, "no attached asset could be loaded");
                ResolvedReferences::empty()
            }
            [only] => ResolvedReferences::start_and_reference(only.clone()),
            _ => ResolvedReferences::references_only(loaded),
        };
        Ok(StrategyOutcome::Resolved(resolved))
    }

    /// Strategy 2: the scene's explicit reference mode.
    pub(crate) async fn explicit_mode(
        &self,
        project: &Project,
        scene_index: usize,
        scene: &Scene,
    ) -> Result<StrategyOutcome, ResolveError> {
        let Some(mode) = scene.reference_mode else {
            return Ok(StrategyOutcome::NoMatch);
        };

        let resolved = match mode {
            ReferenceMode::Previous => {
                if scene_index == 0 {
                    return Err(ResolveError::InvalidFirstScene);
                }
                match self.walk_previous(project, scene_index).await? {
                    Some(image) => ResolvedReferences::start_only(image),
                    None => ResolvedReferences::empty(),
                }
            }
            ReferenceMode::Index(n) => {
                let available = self.available_references(project).await?;
                match checked_index(&available, n) {
                    Some(image) => ResolvedReferences::start_and_reference(image.clone()),
                    None => {
                        tracing::warn!(
                            scene_id = %scene.id,
                            index = n,
                            available = available.len(),
                            "reference index out of range, falling back to all references"
                        );
                        ResolvedReferences::references_only(available)
                    }
                }
            }
            ReferenceMode::Asset(asset_id) => match self.assets.get(asset_id).await? {
                Some(asset) => ResolvedReferences::start_and_reference(
                    ReferenceImage::from_asset(asset.id, asset.image),
                ),
                None => {
                    tracing::warn!(
                        scene_id = %scene.id,
                        asset_id = %asset_id,
                        "referenced asset missing, falling back to all references"
                    );
                    ResolvedReferences::references_only(
                        self.available_references(project).await?,
                    )
                }
            },
        };
        Ok(StrategyOutcome::Resolved(resolved))
    }

    /// Strategy 3: legacy default when no mode is set - all available
    /// references for the first scene, continuity for every later one.
    pub(crate) async fn legacy_default(
        &self,
        project: &Project,
        scene_index: usize,
    ) -> Result<ResolvedReferences, ResolveError> {
        if scene_index == 0 {
            let available = self.available_references(project).await?;
            return Ok(ResolvedReferences::references_only(available));
        }
        Ok(match self.walk_previous(project, scene_index).await? {
            Some(image) => ResolvedReferences::start_only(image),
            None => ResolvedReferences::empty(),
        })
    }

    /// Iterative backward walk for continuity mode.
    ///
    /// Loop invariant: every scene between the walk position and
    /// `scene_index` was either never rendered, had no readable frame, or
    /// carried no concrete binding. The walk is bounded by scene 0.
    async fn walk_previous(
        &self,
        project: &Project,
        scene_index: usize,
    ) -> Result<Option<ReferenceImage>, ResolveError> {
        for visited_index in (0..scene_index).rev() {
            let visited = &project.scenes[visited_index];

            // A scene explicitly bound to a concrete asset wins over its own
            // rendered frames.
            if let Some(mode) = visited.reference_mode {
                if mode.is_concrete() {
                    if let Some(image) = self.concrete_asset(project, mode).await? {
                        return Ok(Some(image));
                    }
                }
            }

            if visited.has_continuity_frame() {
                if let Some(frame_ref) = &visited.last_frame_ref {
                    match self.media.load_frame(frame_ref).await {
                        Ok(image) => {
                            return Ok(Some(ReferenceImage::from_frame(visited.id, image)));
                        }
                        Err(error) => {
                            tracing::warn!(
                                scene_id = %visited.id,
                                frame = %frame_ref,
                                %error,
                                "stored frame unreadable, continuing walk"
                            );
                        }
                    }
                }
            }
        }
        Ok(None)
    }

    /// Resolve a concrete (non-continuity) mode directly to one asset image,
    /// or `None` when it does not resolve.
    async fn concrete_asset(
        &self,
        project: &Project,
        mode: ReferenceMode,
    ) -> Result<Option<ReferenceImage>, AssetStoreError> {
        match mode {
            ReferenceMode::Previous => Ok(None),
            ReferenceMode::Index(n) => {
                let available = self.available_references(project).await?;
                Ok(checked_index(&available, n).cloned())
            }
            ReferenceMode::Asset(asset_id) => Ok(self
                .assets
                .get(asset_id)
                .await?
                .map(|asset| ReferenceImage::from_asset(asset.id, asset.image))),
        }
    }
}

/// 1-based bounds-checked lookup.
fn checked_index(available: &[ReferenceImage], n: u32) -> Option<&ReferenceImage> {
    let position = (n as usize).checked_sub(1)?;
    available.get(position)
}
