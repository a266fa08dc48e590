//! Domain entities.

mod project;
mod result_set;
mod scene;

pub use project::Project;
pub use result_set::{
    GenerationError, GenerationErrorKind, ResultSet, VideoArtifact, VideoGenerationResult,
};
pub use scene::{Evaluation, Scene};
