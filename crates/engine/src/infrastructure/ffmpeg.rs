//! Frame extraction via the ffmpeg binary.

use std::path::PathBuf;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tokio::process::Command;

use storyreel_domain::{ImageData, VideoArtifact};

use crate::ports::{FrameExtractError, FrameExtractorPort};

pub struct FfmpegFrameExtractor {
    /// Binary name or absolute path; "ffmpeg" resolves via PATH.
    binary: String,
}

impl FfmpegFrameExtractor {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn scratch_path(extension: &str) -> PathBuf {
        std::env::temp_dir().join(format!("storyreel-{}.{extension}", uuid::Uuid::new_v4()))
    }
}

impl Default for FfmpegFrameExtractor {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

#[async_trait]
impl FrameExtractorPort for FfmpegFrameExtractor {
    async fn extract(
        &self,
        video: &VideoArtifact,
        timestamp_secs: f64,
    ) -> Result<ImageData, FrameExtractError> {
        // ffmpeg reads URLs directly; byte payloads go through a scratch file
        let mut scratch_input = None;
        let input = match (&video.data, &video.url) {
            (Some(data), _) => {
                let path = Self::scratch_path("mp4");
                tokio::fs::write(&path, data).await?;
                let input = path.to_string_lossy().into_owned();
                scratch_input = Some(path);
                input
            }
            (None, Some(url)) => url.clone(),
            (None, None) => {
                return Err(FrameExtractError::CommandFailed(
                    "video artifact has no data and no url".to_string(),
                ));
            }
        };
        let output = Self::scratch_path("png");

        let result = Command::new(&self.binary)
            .arg("-y")
            .args(["-ss", &format!("{timestamp_secs:.3}")])
            .args(["-i", &input])
            .args(["-frames:v", "1"])
            .arg(&output)
            .output()
            .await;

        if let Some(path) = scratch_input {
            let _ = tokio::fs::remove_file(path).await;
        }

        let status = result?;
        if !status.status.success() {
            let _ = tokio::fs::remove_file(&output).await;
            return Err(FrameExtractError::CommandFailed(
                String::from_utf8_lossy(&status.stderr).into_owned(),
            ));
        }

        let bytes = match tokio::fs::read(&output).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FrameExtractError::NoFrame {
                    timestamp: timestamp_secs,
                });
            }
            Err(e) => return Err(e.into()),
        };
        let _ = tokio::fs::remove_file(&output).await;

        if bytes.is_empty() {
            return Err(FrameExtractError::NoFrame {
                timestamp: timestamp_secs,
            });
        }

        Ok(ImageData::new(BASE64.encode(bytes), "image/png"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn artifacts_without_any_source_are_rejected() {
        let extractor = FfmpegFrameExtractor::default();
        let empty = VideoArtifact {
            url: None,
            data: None,
            mime_type: "video/mp4".to_string(),
        };
        let result = extractor.extract(&empty, 0.0).await;
        assert!(matches!(result, Err(FrameExtractError::CommandFailed(_))));
    }

    #[tokio::test]
    async fn a_missing_binary_surfaces_as_io_error() {
        let extractor = FfmpegFrameExtractor::new("ffmpeg-definitely-not-installed");
        let video = VideoArtifact::from_bytes(b"not-a-video".to_vec(), "video/mp4");
        let result = extractor.extract(&video, 1.0).await;
        assert!(matches!(result, Err(FrameExtractError::Io(_))));
    }
}
