//! Project entity - an ordered sequence of scenes with shared defaults.

use serde::{Deserialize, Serialize};

use crate::entities::Scene;
use crate::ids::{AssetId, ProjectId, SceneId};
use crate::value_objects::ModelId;

/// A multi-scene video story. Owns its scenes; scenes do not outlive it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    /// e.g. "16:9"
    pub aspect_ratio: String,
    pub default_model: ModelId,
    /// e.g. "720p"
    pub default_resolution: String,
    pub scenes: Vec<Scene>,
    /// Legacy per-project character references, used as a fallback when the
    /// project has no database-backed assets.
    pub character_reference_ids: Vec<AssetId>,
}

impl Project {
    pub fn new(name: impl Into<String>, default_model: ModelId) -> Self {
        Self {
            id: ProjectId::new(),
            name: name.into(),
            aspect_ratio: "16:9".to_string(),
            default_model,
            default_resolution: "720p".to_string(),
            scenes: Vec::new(),
            character_reference_ids: Vec::new(),
        }
    }

    pub fn with_scenes(mut self, scenes: Vec<Scene>) -> Self {
        self.scenes = scenes;
        self
    }

    pub fn scene(&self, index: usize) -> Option<&Scene> {
        self.scenes.get(index)
    }

    pub fn scene_index(&self, id: SceneId) -> Option<usize> {
        self.scenes.iter().position(|s| s.id == id)
    }

    /// Structural validation, checked before the project is persisted.
    pub fn validate(&self) -> Result<(), crate::DomainError> {
        if self.name.trim().is_empty() {
            return Err(crate::DomainError::validation("project name must not be empty"));
        }
        for (index, scene) in self.scenes.iter().enumerate() {
            scene
                .validate()
                .map_err(|e| crate::DomainError::validation(format!("scene {index}: {e}")))?;
        }
        Ok(())
    }
}
