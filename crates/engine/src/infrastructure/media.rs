//! Filesystem media store for chosen videos and continuity frames.
//!
//! Frame refs are paths relative to the media root, so documents stay
//! portable when the root moves.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use storyreel_domain::{FrameRef, ImageData, SceneId, VideoArtifact};

use crate::ports::{MediaStoreError, MediaStorePort};

pub struct FsMediaStore {
    root: PathBuf,
}

impl FsMediaStore {
    /// Open (and create if needed) the store rooted at `media_dir`.
    pub async fn open(media_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = media_dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(root.join("videos")).await?;
        tokio::fs::create_dir_all(root.join("frames")).await?;
        Ok(Self { root })
    }

    fn frame_extension(media_type: &str) -> &'static str {
        match media_type {
            "image/jpeg" => "jpg",
            _ => "png",
        }
    }
}

#[async_trait]
impl MediaStorePort for FsMediaStore {
    async fn store_video(
        &self,
        scene_id: SceneId,
        artifact: &VideoArtifact,
    ) -> Result<String, MediaStoreError> {
        if let Some(data) = &artifact.data {
            let rel = format!("videos/{scene_id}.mp4");
            tokio::fs::write(self.root.join(&rel), data).await?;
            return Ok(rel);
        }
        // URL-only artifacts stay vendor-hosted; the ref is the URL itself
        artifact
            .url
            .clone()
            .ok_or_else(|| MediaStoreError::store("store_video", "artifact has no data and no url"))
    }

    async fn store_frame(
        &self,
        scene_id: SceneId,
        label: &str,
        image: &ImageData,
    ) -> Result<FrameRef, MediaStoreError> {
        let bytes = BASE64
            .decode(&image.data)
            .map_err(|e| MediaStoreError::store("store_frame", e))?;
        let rel = format!(
            "frames/{scene_id}-{label}.{}",
            Self::frame_extension(&image.media_type)
        );
        tokio::fs::write(self.root.join(&rel), bytes).await?;
        Ok(FrameRef::new(rel))
    }

    async fn load_frame(&self, frame: &FrameRef) -> Result<ImageData, MediaStoreError> {
        let path = self.root.join(frame.as_str());
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MediaStoreError::NotFound(frame.as_str().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let media_type = if frame.as_str().ends_with(".jpg") {
            "image/jpeg"
        } else {
            "image/png"
        };
        Ok(ImageData::new(BASE64.encode(bytes), media_type))
    }
}
