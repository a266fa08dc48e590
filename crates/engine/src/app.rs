//! Application state and composition.

use std::sync::Arc;

use crate::ports::{
    AssetStorePort, FrameExtractorPort, MediaStorePort, ModelRegistryPort, ProjectRepo,
};
use crate::use_cases::{
    FrameContinuityChain, InflightRegistry, MultiModelGenerationOrchestrator, PendingResults,
    ReferenceResolver, ResultSelector, DEFAULT_FRAME_EPSILON_SECS,
};

/// Main application state.
///
/// Holds the ports and use cases; passed to HTTP handlers via axum state.
pub struct App {
    pub repo: Arc<dyn ProjectRepo>,

    pub resolver: ReferenceResolver,
    pub orchestrator: MultiModelGenerationOrchestrator,
    pub selector: ResultSelector,

    /// Settled result sets awaiting a selection.
    pub pending: PendingResults,
    /// Rejects duplicate generation requests while one is in flight.
    pub inflight: InflightRegistry,
}

impl App {
    /// Wire up the application from its ports.
    pub fn new(
        repo: Arc<dyn ProjectRepo>,
        assets: Arc<dyn AssetStorePort>,
        media: Arc<dyn MediaStorePort>,
        extractor: Arc<dyn FrameExtractorPort>,
        registry: Arc<dyn ModelRegistryPort>,
    ) -> Self {
        Self::with_frame_epsilon(
            repo,
            assets,
            media,
            extractor,
            registry,
            DEFAULT_FRAME_EPSILON_SECS,
        )
    }

    /// Same as [`App::new`] with a non-default end-of-clip frame offset.
    pub fn with_frame_epsilon(
        repo: Arc<dyn ProjectRepo>,
        assets: Arc<dyn AssetStorePort>,
        media: Arc<dyn MediaStorePort>,
        extractor: Arc<dyn FrameExtractorPort>,
        registry: Arc<dyn ModelRegistryPort>,
        frame_epsilon_secs: f64,
    ) -> Self {
        let continuity = Arc::new(
            FrameContinuityChain::new(extractor, media.clone()).with_epsilon(frame_epsilon_secs),
        );

        Self {
            repo: repo.clone(),
            resolver: ReferenceResolver::new(assets, media.clone()),
            orchestrator: MultiModelGenerationOrchestrator::new(registry),
            selector: ResultSelector::new(repo, media, continuity),
            pending: PendingResults::new(),
            inflight: InflightRegistry::new(),
        }
    }
}
