//! Resolved reference imagery - transient values produced per resolution call.

use serde::{Deserialize, Serialize};

use crate::ids::{AssetId, SceneId};

/// Base64-encoded image payload plus MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageData {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/png")
    pub media_type: String,
}

impl ImageData {
    pub fn new(data: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            media_type: media_type.into(),
        }
    }
}

/// Where a resolved reference image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceSource {
    /// A persisted project asset.
    Asset(AssetId),
    /// A frame inherited from a previously rendered scene.
    Frame(SceneId),
}

/// A concrete image ready to feed a video model.
///
/// This is a transient value object: it exists only for the resolution call
/// that produced it and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    pub source: ReferenceSource,
    pub image: ImageData,
}

impl ReferenceImage {
    pub fn from_asset(asset_id: AssetId, image: ImageData) -> Self {
        Self {
            source: ReferenceSource::Asset(asset_id),
            image,
        }
    }

    pub fn from_frame(scene_id: SceneId, image: ImageData) -> Self {
        Self {
            source: ReferenceSource::Frame(scene_id),
            image,
        }
    }
}

/// Output of one reference resolution call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedReferences {
    /// The literal first frame for the video model, if one was resolved.
    pub start_image: Option<ReferenceImage>,
    /// Subject/style reference images, in priority order.
    pub reference_images: Vec<ReferenceImage>,
}

impl ResolvedReferences {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A single concrete image acting as both the literal start frame and the
    /// sole reference.
    pub fn start_and_reference(image: ReferenceImage) -> Self {
        Self {
            start_image: Some(image.clone()),
            reference_images: vec![image],
        }
    }

    /// Continuity resolution: a start frame only, no style references mixed in.
    pub fn start_only(image: ReferenceImage) -> Self {
        Self {
            start_image: Some(image),
            reference_images: Vec::new(),
        }
    }

    /// Style-reference resolution: images bias the model without pinning the
    /// first frame.
    pub fn references_only(images: Vec<ReferenceImage>) -> Self {
        Self {
            start_image: None,
            reference_images: images,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start_image.is_none() && self.reference_images.is_empty()
    }
}
