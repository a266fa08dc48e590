//! StoryReel domain types.
//!
//! Pure types only: typed ids, story entities, and the value objects the
//! generation engine resolves and commits. No I/O, no async.

pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use entities::{
    Evaluation, GenerationError, GenerationErrorKind, Project, ResultSet, Scene, VideoArtifact,
    VideoGenerationResult,
};
pub use error::DomainError;
pub use ids::{AssetId, ProjectId, ResultSetId, SceneId};
pub use value_objects::{
    AssetRole, AttachedAsset, FrameRef, FrameRefs, ImageData, ModelId, ReferenceImage,
    ReferenceMode, ReferenceSource, ResolvedReferences, VendorFamily,
};
