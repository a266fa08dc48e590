//! Use cases - the generation engine's core logic.

pub mod continuity;
pub mod inflight;
pub mod orchestrate;
pub mod resolve;
pub mod select;

pub use continuity::{FrameContinuityChain, DEFAULT_FRAME_EPSILON_SECS};
pub use inflight::InflightRegistry;
pub use orchestrate::{GenerationInput, MultiModelGenerationOrchestrator, OrchestrateError};
pub use resolve::{ReferenceResolver, ResolveError};
pub use select::{PendingResults, ResultSelector, SelectError};
