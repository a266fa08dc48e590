//! Wire contracts shared between the StoryReel engine and its clients.

pub mod requests;
pub mod responses;

pub use requests::{MultiModelGenerateRequest, SceneGenerateRequest, SelectResultRequest, WireImage};
pub use responses::{
    ErrorResponse, ModelResult, MultiModelGenerateResponse, SceneGenerateResponse,
    WireGenerationError,
};
