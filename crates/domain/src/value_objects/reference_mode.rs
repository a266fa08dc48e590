//! Scene reference mode - how a scene picks its starting imagery.

use serde::{Deserialize, Serialize};

use crate::ids::AssetId;

/// How a scene selects the imagery fed to a video model.
///
/// Serialized as the literal string `"previous"`, a 1-based number into the
/// project's available reference images, or a direct asset id string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceMode {
    /// Continue from the nearest prior rendered scene's last frame.
    Previous,
    /// 1-based index into the project's available reference images.
    Index(u32),
    /// Direct asset id (extended variant).
    Asset(AssetId),
}

impl ReferenceMode {
    /// Default mode for a scene at the given position in the project.
    ///
    /// Scene 0 must never default to `Previous` - there is nothing before it
    /// to walk back to.
    pub fn default_for(scene_index: usize) -> Self {
        if scene_index == 0 {
            Self::Index(1)
        } else {
            Self::Previous
        }
    }

    /// True when this mode resolves directly to a concrete asset without
    /// consulting generation history.
    pub fn is_concrete(&self) -> bool {
        !matches!(self, Self::Previous)
    }
}

/// Untagged wire shape: `"previous"`, a number, or an asset id string.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ReferenceModeRepr {
    Number(u32),
    Text(String),
}

impl Serialize for ReferenceMode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr = match self {
            Self::Previous => ReferenceModeRepr::Text("previous".to_string()),
            Self::Index(n) => ReferenceModeRepr::Number(*n),
            Self::Asset(id) => ReferenceModeRepr::Text(id.to_string()),
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ReferenceMode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match ReferenceModeRepr::deserialize(deserializer)? {
            ReferenceModeRepr::Number(n) => Ok(Self::Index(n)),
            ReferenceModeRepr::Text(s) if s == "previous" => Ok(Self::Previous),
            ReferenceModeRepr::Text(s) => {
                let uuid = uuid::Uuid::parse_str(&s).map_err(|_| {
                    serde::de::Error::custom(format!("invalid reference mode: {s}"))
                })?;
                Ok(Self::Asset(AssetId::from_uuid(uuid)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_zero_defaults_to_first_reference_index() {
        assert_eq!(ReferenceMode::default_for(0), ReferenceMode::Index(1));
    }

    #[test]
    fn later_scenes_default_to_previous() {
        assert_eq!(ReferenceMode::default_for(1), ReferenceMode::Previous);
        assert_eq!(ReferenceMode::default_for(7), ReferenceMode::Previous);
    }

    #[test]
    fn round_trips_through_serde() {
        let previous: ReferenceMode =
            serde_json::from_str("\"previous\"").expect("previous keyword");
        assert_eq!(previous, ReferenceMode::Previous);

        let index: ReferenceMode = serde_json::from_str("2").expect("numeric index");
        assert_eq!(index, ReferenceMode::Index(2));

        let asset_id = AssetId::new();
        let json = format!("\"{asset_id}\"");
        let asset: ReferenceMode = serde_json::from_str(&json).expect("asset id");
        assert_eq!(asset, ReferenceMode::Asset(asset_id));

        assert_eq!(
            serde_json::to_string(&ReferenceMode::Previous).expect("serialize"),
            "\"previous\""
        );
        assert_eq!(
            serde_json::to_string(&ReferenceMode::Index(3)).expect("serialize"),
            "3"
        );
    }

    #[test]
    fn rejects_arbitrary_strings() {
        let result: Result<ReferenceMode, _> = serde_json::from_str("\"next\"");
        assert!(result.is_err());
    }
}
