//! Infrastructure adapters - concrete implementations of the engine's ports.

pub mod ffmpeg;
pub mod json_store;
pub mod media;
pub mod registry;
pub mod sora;
pub mod veo;

pub use ffmpeg::FfmpegFrameExtractor;
pub use json_store::JsonProjectStore;
pub use media::FsMediaStore;
pub use registry::ModelRegistry;
pub use sora::OpenAiSoraClient;
pub use veo::GeminiVeoClient;
