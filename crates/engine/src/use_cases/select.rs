//! Result selection - commits exactly one chosen artifact onto a scene.

use std::sync::Arc;

use dashmap::DashMap;
use storyreel_domain::{ModelId, ProjectId, ResultSet, ResultSetId, Scene};

use crate::ports::{MediaStorePort, ProjectRepo, RepoError};
use crate::use_cases::continuity::FrameContinuityChain;

#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    #[error("model {0} is not part of this result set")]
    UnknownModel(ModelId),

    /// Only non-error results are selectable.
    #[error("result for model {0} is not selectable")]
    NotSelectable(ModelId),

    #[error("scene for result set not found in project")]
    SceneNotFound,

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    Media(#[from] crate::ports::MediaStoreError),
}

/// Holds settled result sets awaiting a human (or fast-path) choice.
///
/// A committed choice discards the set and its unselected artifacts; they
/// must be regenerated to be seen again. A rejected choice is re-parked by
/// the caller and stays selectable.
#[derive(Default)]
pub struct PendingResults {
    inner: DashMap<ResultSetId, ResultSet>,
}

impl PendingResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, result_set: ResultSet) -> ResultSetId {
        let id = result_set.id;
        self.inner.insert(id, result_set);
        id
    }

    pub fn take(&self, id: ResultSetId) -> Option<ResultSet> {
        self.inner.remove(&id).map(|(_, set)| set)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Commits a chosen generation result onto its scene.
pub struct ResultSelector {
    repo: Arc<dyn ProjectRepo>,
    media: Arc<dyn MediaStorePort>,
    continuity: Arc<FrameContinuityChain>,
}

impl ResultSelector {
    pub fn new(
        repo: Arc<dyn ProjectRepo>,
        media: Arc<dyn MediaStorePort>,
        continuity: Arc<FrameContinuityChain>,
    ) -> Self {
        Self {
            repo,
            media,
            continuity,
        }
    }

    /// Commit the chosen model's artifact onto the scene.
    ///
    /// Persists the artifact as the scene's video ref, marks it generated,
    /// commits continuity frames, and clears any prior evaluation. The set is
    /// only borrowed; on an error the caller still owns it and can keep it
    /// selectable.
    pub async fn select(
        &self,
        project_id: ProjectId,
        result_set: &ResultSet,
        model: &ModelId,
    ) -> Result<Scene, SelectError> {
        let chosen = result_set
            .get(model)
            .ok_or_else(|| SelectError::UnknownModel(model.clone()))?;
        let artifact = chosen
            .artifact()
            .ok_or_else(|| SelectError::NotSelectable(model.clone()))?
            .clone();

        let mut project = self
            .repo
            .get(project_id)
            .await?
            .ok_or_else(|| RepoError::not_found("Project", project_id))?;
        let scene_index = project
            .scene_index(result_set.scene_id)
            .ok_or(SelectError::SceneNotFound)?;

        let video_ref = self
            .media
            .store_video(result_set.scene_id, &artifact)
            .await?;

        let duration = project.scenes[scene_index].duration_seconds;
        let frames = self
            .continuity
            .commit_frames(result_set.scene_id, duration, &artifact)
            .await;
        if frames.is_none() {
            tracing::warn!(
                scene_id = %result_set.scene_id,
                "continuity frames unavailable; next scene will walk further back"
            );
        }

        let scene = &mut project.scenes[scene_index];
        scene.commit_generation(video_ref, frames);
        let committed = scene.clone();

        self.repo.save(&project).await?;
        tracing::info!(
            scene_id = %committed.id,
            model = %model,
            "selection committed"
        );
        Ok(committed)
    }

    /// Single-model fast path: commit the sole result without an explicit
    /// choice. Returns `None` when the set has more than one entry (an
    /// explicit choice is required) or its sole entry failed.
    pub async fn auto_select(
        &self,
        project_id: ProjectId,
        result_set: &ResultSet,
    ) -> Result<Option<Scene>, SelectError> {
        let Some(sole) = result_set.sole_result() else {
            return Ok(None);
        };
        if !sole.is_success() {
            return Ok(None);
        }
        let model = sole.model.clone();
        self.select(project_id, result_set, &model).await.map(Some)
    }
}
