//! Model registry - maps model ids onto vendor adapters.

use std::collections::HashSet;
use std::sync::Arc;

use storyreel_domain::{ModelId, VendorFamily};

use crate::ports::{ModelRegistryPort, VideoGenPort};

struct RegistryEntry {
    model: ModelId,
    family: VendorFamily,
    adapter: Arc<dyn VideoGenPort>,
}

/// Static table of recognized models, their vendor family, and the adapter
/// that serves them. Credential presence is recorded per family at startup.
#[derive(Default)]
pub struct ModelRegistry {
    entries: Vec<RegistryEntry>,
    configured: HashSet<VendorFamily>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        mut self,
        model: impl Into<ModelId>,
        family: VendorFamily,
        adapter: Arc<dyn VideoGenPort>,
    ) -> Self {
        self.entries.push(RegistryEntry {
            model: model.into(),
            family,
            adapter,
        });
        self
    }

    /// Mark a vendor family as having credentials configured.
    pub fn with_credentials(mut self, family: VendorFamily) -> Self {
        self.configured.insert(family);
        self
    }

    fn entry(&self, model: &ModelId) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| &e.model == model)
    }
}

impl ModelRegistryPort for ModelRegistry {
    fn adapter(&self, model: &ModelId) -> Option<Arc<dyn VideoGenPort>> {
        self.entry(model).map(|e| e.adapter.clone())
    }

    fn family(&self, model: &ModelId) -> Option<VendorFamily> {
        self.entry(model).map(|e| e.family)
    }

    fn valid_models(&self) -> Vec<ModelId> {
        self.entries.iter().map(|e| e.model.clone()).collect()
    }

    fn has_credentials(&self, family: VendorFamily) -> bool {
        self.configured.contains(&family)
    }
}
