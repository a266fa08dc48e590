//! Addressable references to extracted video frames.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque pointer to a persisted frame image (file URL or asset ref).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRef(String);

impl FrameRef {
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FrameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for FrameRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The first/last frame pair committed after a successful generation.
///
/// Both refs are always present together - frame commit never produces a
/// partial pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRefs {
    pub first: FrameRef,
    pub last: FrameRef,
}

impl FrameRefs {
    pub fn new(first: FrameRef, last: FrameRef) -> Self {
        Self { first, last }
    }
}
