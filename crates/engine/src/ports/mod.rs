//! Port traits for the engine's external collaborators.
//!
//! The vendor adapters, asset/media stores, and frame extractor are
//! collaborators of the generation engine; everything the use cases need
//! from them is expressed here as object-safe traits so tests can inject
//! mocks.

mod error;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use storyreel_domain::{
    AssetId, FrameRef, ImageData, ModelId, Project, ProjectId, SceneId, VendorFamily,
    VideoArtifact,
};

pub use error::{
    AssetStoreError, FrameExtractError, MediaStoreError, MissingCredentials, RepoError,
    VideoGenError,
};

// =============================================================================
// Asset store
// =============================================================================

/// An immutable image asset addressable by id.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAsset {
    pub id: AssetId,
    pub project_id: ProjectId,
    pub name: String,
    pub image: ImageData,
    pub created_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetStorePort: Send + Sync {
    /// Look up one asset; a missing id is `Ok(None)`, not an error.
    async fn get(&self, id: AssetId) -> Result<Option<StoredAsset>, AssetStoreError>;

    /// All assets for a project, in an order that is stable within a session.
    async fn list_by_project(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<StoredAsset>, AssetStoreError>;
}

// =============================================================================
// Vendor video generation
// =============================================================================

/// One resolved generation call for one model.
#[derive(Debug, Clone)]
pub struct VideoRequest {
    pub model: ModelId,
    pub prompt: String,
    /// The literal first frame, when resolution produced one.
    pub start_image: Option<ImageData>,
    /// Target final frame, for vendors that support interpolation toward it.
    pub end_image: Option<ImageData>,
    /// Subject/style references, in priority order.
    pub reference_images: Vec<ImageData>,
    pub aspect_ratio: Option<String>,
    pub resolution: Option<String>,
    pub duration_seconds: Option<f64>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoGenPort: Send + Sync {
    async fn generate(&self, request: VideoRequest) -> Result<VideoArtifact, VideoGenError>;
}

/// Maps model ids onto vendor adapters and knows which vendor families have
/// credentials configured.
pub trait ModelRegistryPort: Send + Sync {
    fn adapter(&self, model: &ModelId) -> Option<Arc<dyn VideoGenPort>>;

    fn family(&self, model: &ModelId) -> Option<VendorFamily>;

    /// The full set of recognized model ids, for 400 responses.
    fn valid_models(&self) -> Vec<ModelId>;

    fn has_credentials(&self, family: VendorFamily) -> bool;
}

// =============================================================================
// Frame extraction
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FrameExtractorPort: Send + Sync {
    /// Extract a still frame at `timestamp_secs` into an inline image.
    async fn extract(
        &self,
        video: &VideoArtifact,
        timestamp_secs: f64,
    ) -> Result<ImageData, FrameExtractError>;
}

// =============================================================================
// Media store
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStorePort: Send + Sync {
    /// Persist a chosen video artifact; returns its addressable ref.
    async fn store_video(
        &self,
        scene_id: SceneId,
        artifact: &VideoArtifact,
    ) -> Result<String, MediaStoreError>;

    /// Persist an extracted frame under a label ("first"/"last"); returns its ref.
    async fn store_frame(
        &self,
        scene_id: SceneId,
        label: &str,
        image: &ImageData,
    ) -> Result<FrameRef, MediaStoreError>;

    /// Load a previously stored frame back as inline image data.
    async fn load_frame(&self, frame: &FrameRef) -> Result<ImageData, MediaStoreError>;
}

// =============================================================================
// Project persistence
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepo: Send + Sync {
    async fn get(&self, id: ProjectId) -> Result<Option<Project>, RepoError>;
    async fn save(&self, project: &Project) -> Result<(), RepoError>;
    async fn list(&self) -> Result<Vec<Project>, RepoError>;
}
