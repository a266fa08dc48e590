//! Error types for port operations.

use storyreel_domain::{GenerationError, GenerationErrorKind, VendorFamily};

/// Repository operation errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Entity not found - includes entity type and ID for actionable error messages.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Storage operation failed - includes operation name for tracing.
    #[error("Storage error in {operation}: {message}")]
    Storage {
        operation: &'static str,
        message: String,
    },

    /// Serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RepoError {
    /// Create a NotFound error with entity type and ID context.
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Create a Storage error with operation context.
    pub fn storage(operation: &'static str, message: impl ToString) -> Self {
        Self::Storage {
            operation,
            message: message.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Asset lookups are read-only; failures here are infrastructure failures,
/// never business outcomes (a missing asset is `Ok(None)`).
#[derive(Debug, thiserror::Error)]
pub enum AssetStoreError {
    #[error("Asset store error in {operation}: {message}")]
    Store {
        operation: &'static str,
        message: String,
    },
}

impl AssetStoreError {
    pub fn store(operation: &'static str, message: impl ToString) -> Self {
        Self::Store {
            operation,
            message: message.to_string(),
        }
    }
}

/// Per-model vendor generation failure.
///
/// Scoped to one model in a multi-model batch; the orchestrator converts
/// these into per-result error descriptors, never letting them escalate
/// across sibling models.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VideoGenError {
    #[error("Content policy rejection: {message}")]
    ContentPolicy {
        message: String,
        flagged_input: Option<String>,
    },
    #[error("Generation timed out: {0}")]
    Timeout(String),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Quota exceeded: {0}")]
    Quota(String),
    #[error("Malformed vendor response: {0}")]
    MalformedResponse(String),
    #[error("Request failed: {0}")]
    RequestFailed(String),
}

impl VideoGenError {
    /// Convert into the domain's structured per-model error descriptor.
    pub fn into_generation_error(self) -> GenerationError {
        match self {
            Self::ContentPolicy {
                message,
                flagged_input,
            } => {
                let error = GenerationError::new(GenerationErrorKind::ContentPolicy, message);
                match flagged_input {
                    Some(input) => error.with_flagged_input(input),
                    None => error,
                }
            }
            Self::Timeout(message) => GenerationError::new(GenerationErrorKind::Timeout, message),
            Self::Auth(message) => GenerationError::new(GenerationErrorKind::Auth, message),
            Self::Quota(message) => GenerationError::new(GenerationErrorKind::Quota, message),
            Self::MalformedResponse(message) => {
                GenerationError::new(GenerationErrorKind::MalformedResponse, message)
            }
            Self::RequestFailed(message) => {
                GenerationError::new(GenerationErrorKind::RequestFailed, message)
            }
        }
    }
}

/// Frame extraction failure. Never invalidates an otherwise-successful
/// generation; continuity for the next scene degrades instead.
#[derive(Debug, thiserror::Error)]
pub enum FrameExtractError {
    #[error("Frame extraction command failed: {0}")]
    CommandFailed(String),
    #[error("Frame extraction I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No frame decoded at timestamp {timestamp}s")]
    NoFrame { timestamp: f64 },
}

/// Media persistence failure (frames, chosen artifacts).
#[derive(Debug, thiserror::Error)]
pub enum MediaStoreError {
    #[error("Media store error in {operation}: {message}")]
    Store {
        operation: &'static str,
        message: String,
    },
    #[error("Media not found: {0}")]
    NotFound(String),
    #[error("Media I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaStoreError {
    pub fn store(operation: &'static str, message: impl ToString) -> Self {
        Self::Store {
            operation,
            message: message.to_string(),
        }
    }
}

/// Configuration failure: a requested vendor family has no credentials.
///
/// Fatal for the whole request and surfaced before any generation begins.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Missing credentials for vendor family {family}")]
pub struct MissingCredentials {
    pub family: VendorFamily,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_gen_error_maps_to_structured_descriptor() {
        let error = VideoGenError::ContentPolicy {
            message: "prompt flagged".to_string(),
            flagged_input: Some("startImage".to_string()),
        }
        .into_generation_error();
        assert_eq!(error.kind, GenerationErrorKind::ContentPolicy);
        assert_eq!(error.flagged_input.as_deref(), Some("startImage"));

        let timeout = VideoGenError::Timeout("deadline".to_string()).into_generation_error();
        assert_eq!(timeout.kind, GenerationErrorKind::Timeout);
        assert!(timeout.flagged_input.is_none());
    }

    #[test]
    fn repo_not_found_carries_context() {
        let error = RepoError::not_found("Project", "abc123");
        assert!(error.is_not_found());
        assert!(error.to_string().contains("Project"));
        assert!(error.to_string().contains("abc123"));
    }
}
