//! Per-key in-flight request registry.
//!
//! Replaces a module-level re-entrancy flag: duplicate generation requests
//! for the same fingerprint are rejected while one is in progress, and the
//! registry is an injected dependency rather than process-global state, so
//! tests stay isolated.

use std::sync::Arc;
use std::time::Instant;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Tracks request fingerprints currently being processed.
#[derive(Default, Clone)]
pub struct InflightRegistry {
    inner: Arc<DashMap<String, Instant>>,
}

impl InflightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a fingerprint. Returns `None` when an identical request is
    /// already in flight; otherwise the returned guard releases the claim
    /// when dropped.
    pub fn begin(&self, key: impl Into<String>) -> Option<InflightGuard> {
        let key = key.into();
        match self.inner.entry(key.clone()) {
            Entry::Occupied(occupied) => {
                tracing::debug!(
                    key = %key,
                    in_flight_for = ?occupied.get().elapsed(),
                    "duplicate request rejected"
                );
                None
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Instant::now());
                Some(InflightGuard {
                    registry: self.inner.clone(),
                    key,
                })
            }
        }
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }
}

/// RAII claim on one request fingerprint.
pub struct InflightGuard {
    registry: Arc<DashMap<String, Instant>>,
    key: String,
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        self.registry.remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_keys_are_rejected_until_the_guard_drops() {
        let registry = InflightRegistry::new();

        let guard = registry.begin("scene-7:veo-3.1").expect("first claim");
        assert!(registry.begin("scene-7:veo-3.1").is_none());
        assert!(registry.is_in_flight("scene-7:veo-3.1"));

        // Unrelated keys are unaffected
        let other = registry.begin("scene-8:veo-3.1").expect("other key");
        drop(other);

        drop(guard);
        assert!(!registry.is_in_flight("scene-7:veo-3.1"));
        assert!(registry.begin("scene-7:veo-3.1").is_some());
    }
}
