//! Engine configuration, loaded from environment variables.

use std::path::PathBuf;

/// Runtime settings for the engine process.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server_host: String,
    pub server_port: u16,
    pub data_dir: PathBuf,
    pub media_dir: PathBuf,
    pub ffmpeg_binary: String,
    /// Offset subtracted from a clip's end for the last-frame grab.
    pub frame_epsilon_secs: f64,
    pub google_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub gemini_base_url: String,
    pub openai_base_url: String,
}

impl Settings {
    pub fn from_env() -> Self {
        let server_host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let server_port: u16 = std::env::var("SERVER_PORT")
            .or_else(|_| std::env::var("PORT"))
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .unwrap_or(3000);

        Self {
            server_host,
            server_port,
            data_dir: std::env::var("DATA_DIR")
                .unwrap_or_else(|_| "data".into())
                .into(),
            media_dir: std::env::var("MEDIA_DIR")
                .unwrap_or_else(|_| "media".into())
                .into(),
            ffmpeg_binary: std::env::var("FFMPEG_BINARY").unwrap_or_else(|_| "ffmpeg".into()),
            frame_epsilon_secs: std::env::var("FRAME_EPSILON_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(crate::use_cases::DEFAULT_FRAME_EPSILON_SECS),
            google_api_key: std::env::var("GOOGLE_API_KEY").ok().filter(|k| !k.is_empty()),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            gemini_base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".into()),
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".into()),
        }
    }
}
