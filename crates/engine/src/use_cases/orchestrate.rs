//! Multi-model generation fan-out.
//!
//! One resolved input is dispatched to every requested model concurrently;
//! per-model failures are recovered into data and never cancel sibling
//! calls. The orchestrator waits for all dispatched calls to settle - the
//! product intent is explicit comparison across models, so there is no
//! early return on first success.

use std::sync::Arc;
use std::time::Instant;

use storyreel_domain::{
    GenerationError, GenerationErrorKind, ImageData, ModelId, ResolvedReferences,
    VideoGenerationResult,
};

use crate::ports::{MissingCredentials, ModelRegistryPort, VideoGenPort, VideoRequest};

/// The per-request generation parameters shared by every dispatched model.
#[derive(Debug, Clone)]
pub struct GenerationInput {
    pub prompt: String,
    pub start_image: Option<ImageData>,
    pub end_image: Option<ImageData>,
    pub reference_images: Vec<ImageData>,
    pub aspect_ratio: Option<String>,
    pub resolution: Option<String>,
    pub duration_seconds: Option<f64>,
}

impl GenerationInput {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            start_image: None,
            end_image: None,
            reference_images: Vec::new(),
            aspect_ratio: None,
            resolution: None,
            duration_seconds: None,
        }
    }

    /// Build from a resolution result, dropping the transient source tags.
    pub fn from_resolved(prompt: impl Into<String>, resolved: ResolvedReferences) -> Self {
        Self {
            prompt: prompt.into(),
            start_image: resolved.start_image.map(|image| image.image),
            end_image: None,
            reference_images: resolved
                .reference_images
                .into_iter()
                .map(|image| image.image)
                .collect(),
            aspect_ratio: None,
            resolution: None,
            duration_seconds: None,
        }
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: Option<String>) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn with_resolution(mut self, resolution: Option<String>) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_duration(mut self, duration_seconds: Option<f64>) -> Self {
        self.duration_seconds = duration_seconds;
        self
    }

    fn request_for(&self, model: ModelId) -> VideoRequest {
        VideoRequest {
            model,
            prompt: self.prompt.clone(),
            start_image: self.start_image.clone(),
            end_image: self.end_image.clone(),
            reference_images: self.reference_images.clone(),
            aspect_ratio: self.aspect_ratio.clone(),
            resolution: self.resolution.clone(),
            duration_seconds: self.duration_seconds,
        }
    }
}

/// Structurally invalid input, rejected before any generation work begins.
#[derive(Debug, thiserror::Error)]
pub enum OrchestrateError {
    #[error("no models requested")]
    NoModels,

    #[error("prompt must not be empty")]
    MissingPrompt,

    #[error("unrecognized model id: {model}")]
    UnknownModel { model: ModelId, valid: Vec<ModelId> },

    #[error(transparent)]
    MissingCredentials(#[from] MissingCredentials),
}

/// Fans one resolved input out to N vendor adapters and joins all outcomes.
pub struct MultiModelGenerationOrchestrator {
    registry: Arc<dyn ModelRegistryPort>,
}

impl MultiModelGenerationOrchestrator {
    pub fn new(registry: Arc<dyn ModelRegistryPort>) -> Self {
        Self { registry }
    }

    /// Dispatch one call per model concurrently and wait for all to settle.
    ///
    /// The returned results are positionally aligned with `models`. A failed
    /// model produces an error-carrying result in its slot; sibling calls
    /// keep running.
    pub async fn generate(
        &self,
        models: &[ModelId],
        input: &GenerationInput,
    ) -> Result<Vec<VideoGenerationResult>, OrchestrateError> {
        if models.is_empty() {
            return Err(OrchestrateError::NoModels);
        }
        if input.prompt.trim().is_empty() {
            return Err(OrchestrateError::MissingPrompt);
        }

        // Validate the whole batch before dispatching anything: unknown ids
        // and missing credentials are configuration failures, not per-model
        // outcomes.
        let mut adapters: Vec<(ModelId, Arc<dyn VideoGenPort>)> = Vec::with_capacity(models.len());
        for model in models {
            let adapter =
                self.registry
                    .adapter(model)
                    .ok_or_else(|| OrchestrateError::UnknownModel {
                        model: model.clone(),
                        valid: self.registry.valid_models(),
                    })?;
            let family =
                self.registry
                    .family(model)
                    .ok_or_else(|| OrchestrateError::UnknownModel {
                        model: model.clone(),
                        valid: self.registry.valid_models(),
                    })?;
            if !self.registry.has_credentials(family) {
                return Err(MissingCredentials { family }.into());
            }
            adapters.push((model.clone(), adapter));
        }

        tracing::info!(models = models.len(), "dispatching multi-model generation");

        let mut handles = Vec::with_capacity(adapters.len());
        for (model, adapter) in adapters {
            let request = input.request_for(model.clone());
            handles.push((
                model.clone(),
                tokio::spawn(async move {
                    let started = Instant::now();
                    let outcome = adapter.generate(request).await;
                    let elapsed = started.elapsed();
                    match outcome {
                        Ok(artifact) => {
                            tracing::info!(%model, ?elapsed, "model generation succeeded");
                            VideoGenerationResult::success(model, artifact, elapsed)
                        }
                        Err(error) => {
                            tracing::warn!(%model, ?elapsed, %error, "model generation failed");
                            VideoGenerationResult::failure(
                                model,
                                error.into_generation_error(),
                                elapsed,
                            )
                        }
                    }
                }),
            ));
        }

        // Join in dispatch order so results stay positionally aligned with
        // the request. A panicked task becomes an error result for its slot
        // only.
        let mut results = Vec::with_capacity(handles.len());
        for (model, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(join_error) => VideoGenerationResult::failure(
                    model,
                    GenerationError::new(
                        GenerationErrorKind::RequestFailed,
                        format!("generation task aborted: {join_error}"),
                    ),
                    std::time::Duration::ZERO,
                ),
            };
            results.push(result);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    use async_trait::async_trait;
    use storyreel_domain::{VendorFamily, VideoArtifact};

    use crate::ports::VideoGenError;

    /// Adapter stub with a configurable latency and outcome.
    struct StubAdapter {
        delay: Duration,
        outcome: Result<VideoArtifact, VideoGenError>,
    }

    #[async_trait]
    impl VideoGenPort for StubAdapter {
        async fn generate(&self, _request: VideoRequest) -> Result<VideoArtifact, VideoGenError> {
            tokio::time::sleep(self.delay).await;
            self.outcome.clone()
        }
    }

    struct StubRegistry {
        entries: HashMap<ModelId, (VendorFamily, Arc<dyn VideoGenPort>)>,
        credentialed: Vec<VendorFamily>,
    }

    impl ModelRegistryPort for StubRegistry {
        fn adapter(&self, model: &ModelId) -> Option<Arc<dyn VideoGenPort>> {
            self.entries.get(model).map(|(_, adapter)| adapter.clone())
        }

        fn family(&self, model: &ModelId) -> Option<VendorFamily> {
            self.entries.get(model).map(|(family, _)| *family)
        }

        fn valid_models(&self) -> Vec<ModelId> {
            let mut models: Vec<ModelId> = self.entries.keys().cloned().collect();
            models.sort_by(|a, b| a.as_str().cmp(b.as_str()));
            models
        }

        fn has_credentials(&self, family: VendorFamily) -> bool {
            self.credentialed.contains(&family)
        }
    }

    fn registry(entries: Vec<(&str, VendorFamily, StubAdapter)>) -> StubRegistry {
        StubRegistry {
            entries: entries
                .into_iter()
                .map(|(id, family, adapter)| {
                    (
                        ModelId::from(id),
                        (family, Arc::new(adapter) as Arc<dyn VideoGenPort>),
                    )
                })
                .collect(),
            credentialed: vec![VendorFamily::Google, VendorFamily::OpenAi],
        }
    }

    fn artifact(url: &str) -> VideoArtifact {
        VideoArtifact::from_url(url, "video/mp4")
    }

    #[tokio::test]
    async fn one_failing_model_does_not_degrade_its_siblings() {
        let registry = registry(vec![
            (
                "veo-3.1",
                VendorFamily::Google,
                StubAdapter {
                    delay: Duration::from_millis(50),
                    outcome: Ok(artifact("https://cdn.example/veo.mp4")),
                },
            ),
            (
                "sora-turbo",
                VendorFamily::OpenAi,
                StubAdapter {
                    delay: Duration::from_millis(20),
                    outcome: Err(VideoGenError::ContentPolicy {
                        message: "flagged".to_string(),
                        flagged_input: Some("prompt".to_string()),
                    }),
                },
            ),
            (
                "veo-3.1-fast",
                VendorFamily::Google,
                StubAdapter {
                    delay: Duration::from_millis(60),
                    outcome: Ok(artifact("https://cdn.example/fast.mp4")),
                },
            ),
        ]);

        let orchestrator = MultiModelGenerationOrchestrator::new(Arc::new(registry));
        let models = [
            ModelId::from("veo-3.1"),
            ModelId::from("sora-turbo"),
            ModelId::from("veo-3.1-fast"),
        ];

        let started = Instant::now();
        let results = orchestrator
            .generate(&models, &GenerationInput::new("a storm rolls in"))
            .await
            .expect("generate");
        let total = started.elapsed();

        assert_eq!(results.len(), 3);
        // Positional alignment with the request
        assert_eq!(results[0].model, models[0]);
        assert_eq!(results[1].model, models[1]);
        assert_eq!(results[2].model, models[2]);
        assert!(results[0].is_success());
        assert!(!results[1].is_success());
        assert!(results[2].is_success());
        assert_eq!(
            results[1].error().map(|e| e.kind),
            Some(GenerationErrorKind::ContentPolicy)
        );

        // Concurrent dispatch: total ≈ max latency, not the sum (130ms).
        assert!(total < Duration::from_millis(120), "took {total:?}");
    }

    #[tokio::test]
    async fn empty_model_list_is_rejected_before_dispatch() {
        let orchestrator = MultiModelGenerationOrchestrator::new(Arc::new(registry(vec![])));
        let result = orchestrator
            .generate(&[], &GenerationInput::new("prompt"))
            .await;
        assert!(matches!(result, Err(OrchestrateError::NoModels)));
    }

    #[tokio::test]
    async fn blank_prompt_is_rejected_before_dispatch() {
        let registry = registry(vec![(
            "veo-3.1",
            VendorFamily::Google,
            StubAdapter {
                delay: Duration::ZERO,
                outcome: Ok(artifact("https://cdn.example/veo.mp4")),
            },
        )]);
        let orchestrator = MultiModelGenerationOrchestrator::new(Arc::new(registry));
        let result = orchestrator
            .generate(&[ModelId::from("veo-3.1")], &GenerationInput::new("   "))
            .await;
        assert!(matches!(result, Err(OrchestrateError::MissingPrompt)));
    }

    #[tokio::test]
    async fn unknown_model_lists_the_valid_set() {
        let registry = registry(vec![(
            "veo-3.1",
            VendorFamily::Google,
            StubAdapter {
                delay: Duration::ZERO,
                outcome: Ok(artifact("https://cdn.example/veo.mp4")),
            },
        )]);
        let orchestrator = MultiModelGenerationOrchestrator::new(Arc::new(registry));
        let result = orchestrator
            .generate(
                &[ModelId::from("veo-99")],
                &GenerationInput::new("a lighthouse"),
            )
            .await;
        match result {
            Err(OrchestrateError::UnknownModel { model, valid }) => {
                assert_eq!(model, ModelId::from("veo-99"));
                assert_eq!(valid, vec![ModelId::from("veo-3.1")]);
            }
            other => panic!("expected UnknownModel, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_credentials_fail_the_whole_request_up_front() {
        let mut registry = registry(vec![(
            "sora-turbo",
            VendorFamily::OpenAi,
            StubAdapter {
                delay: Duration::ZERO,
                outcome: Ok(artifact("https://cdn.example/sora.mp4")),
            },
        )]);
        registry.credentialed = vec![VendorFamily::Google];

        let orchestrator = MultiModelGenerationOrchestrator::new(Arc::new(registry));
        let result = orchestrator
            .generate(
                &[ModelId::from("sora-turbo")],
                &GenerationInput::new("a lighthouse"),
            )
            .await;
        assert!(matches!(
            result,
            Err(OrchestrateError::MissingCredentials(MissingCredentials {
                family: VendorFamily::OpenAi
            }))
        ));
    }
}
