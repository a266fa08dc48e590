//! Explicit per-scene asset attachments.

use serde::{Deserialize, Serialize};

use crate::ids::AssetId;

/// Role an attached asset plays for the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetRole {
    Character,
    Style,
    Location,
    #[serde(other)]
    Other,
}

/// An explicit, highest-priority attachment of an asset to a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedAsset {
    pub asset_id: AssetId,
    pub role: AssetRole,
    /// Position within the attachment list; lower comes first.
    pub order: u32,
}

impl AttachedAsset {
    pub fn new(asset_id: AssetId, role: AssetRole, order: u32) -> Self {
        Self {
            asset_id,
            role,
            order,
        }
    }
}
