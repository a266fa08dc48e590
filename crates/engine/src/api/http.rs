//! HTTP routes.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::sync::Arc;
use uuid::Uuid;

use storyreel_domain::{
    ImageData, ModelId, Project, ProjectId, ResultSet, ResultSetId, Scene, VideoGenerationResult,
};
use storyreel_shared::{
    ErrorResponse, ModelResult, MultiModelGenerateRequest, MultiModelGenerateResponse,
    SceneGenerateRequest, SceneGenerateResponse, SelectResultRequest, WireGenerationError,
    WireImage,
};

use crate::app::App;
use crate::use_cases::{GenerationInput, OrchestrateError, ResolveError, SelectError};

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/projects", get(list_projects).post(create_project))
        .route("/api/projects/{id}", get(get_project).put(update_project))
        .route("/generate-video-multi", post(generate_video_multi))
        .route("/api/generate-video-multi", post(generate_video_multi))
        .route(
            "/api/projects/{id}/scenes/{index}/generate",
            post(generate_scene),
        )
        .route(
            "/api/projects/{id}/scenes/{index}/select",
            post(select_result),
        )
}

async fn health() -> &'static str {
    "OK"
}

async fn list_projects(State(app): State<Arc<App>>) -> Result<Json<Vec<Project>>, ApiError> {
    let projects = app
        .repo
        .list()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(projects))
}

async fn get_project(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Project>, ApiError> {
    let project = app
        .repo
        .get(ProjectId::from_uuid(id))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(project))
}

async fn create_project(
    State(app): State<Arc<App>>,
    Json(project): Json<Project>,
) -> Result<Json<Project>, ApiError> {
    project
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    app.repo
        .save(&project)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(project))
}

async fn update_project(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Json(project): Json<Project>,
) -> Result<Json<Project>, ApiError> {
    if project.id != ProjectId::from_uuid(id) {
        return Err(ApiError::BadRequest(
            "project id in body does not match the path".to_string(),
        ));
    }
    project
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    app.repo
        .save(&project)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(project))
}

// =============================================================================
// Generation
// =============================================================================

/// Ad-hoc multi-model generation, not tied to a project.
async fn generate_video_multi(
    State(app): State<Arc<App>>,
    Json(request): Json<MultiModelGenerateRequest>,
) -> Result<Json<MultiModelGenerateResponse>, ApiError> {
    let models: Vec<ModelId> = request.models.iter().cloned().map(ModelId::from).collect();

    let mut input = GenerationInput::new(request.prompt)
        .with_aspect_ratio(request.aspect_ratio)
        .with_resolution(request.resolution);
    input.reference_images = request
        .reference_images
        .unwrap_or_default()
        .iter()
        .map(wire_image)
        .collect();
    if let Some(data_url) = &request.start_frame_data_url {
        input.start_image = Some(parse_data_url(data_url)?);
    }
    if let Some(data_url) = &request.end_frame_data_url {
        input.end_image = Some(parse_data_url(data_url)?);
    }

    let results = app
        .orchestrator
        .generate(&models, &input)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(MultiModelGenerateResponse {
        results: results.iter().map(model_result).collect(),
    }))
}

/// Generate a project scene across one or more models.
///
/// With a single model the sole successful result is committed immediately;
/// with several the settled set is parked for an explicit selection.
async fn generate_scene(
    State(app): State<Arc<App>>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(request): Json<SceneGenerateRequest>,
) -> Result<Json<SceneGenerateResponse>, ApiError> {
    let project_id = ProjectId::from_uuid(id);
    let project = app
        .repo
        .get(project_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or(ApiError::NotFound)?;
    let scene = project.scene(index).ok_or(ApiError::NotFound)?;

    // One generation per scene at a time; the guard releases on return
    let _guard = app
        .inflight
        .begin(format!("{project_id}:{index}"))
        .ok_or_else(|| {
            ApiError::Conflict(format!("generation already in flight for scene {index}"))
        })?;

    let models: Vec<ModelId> = match &request.models {
        Some(models) if !models.is_empty() => models.iter().cloned().map(ModelId::from).collect(),
        _ => vec![project.default_model.clone()],
    };

    let resolved = app.resolver.resolve(&project, index).await?;
    let input = GenerationInput::from_resolved(scene.prompt.clone(), resolved)
        .with_aspect_ratio(Some(project.aspect_ratio.clone()))
        .with_resolution(Some(project.default_resolution.clone()))
        .with_duration(Some(scene.duration_seconds));

    let results = app
        .orchestrator
        .generate(&models, &input)
        .await
        .map_err(ApiError::from)?;
    let result_set = ResultSet::new(scene.id, results);
    let wire_results: Vec<ModelResult> = result_set.results.iter().map(model_result).collect();
    let result_set_id = result_set.id;

    let auto_committed = if result_set.sole_result().is_some() {
        // Single-model fast path; a failed sole result is simply dropped,
        // there is nothing selectable in it
        app.selector
            .auto_select(project_id, &result_set)
            .await?
            .is_some()
    } else {
        app.pending.insert(result_set);
        false
    };

    Ok(Json(SceneGenerateResponse {
        result_set_id: result_set_id.to_string(),
        results: wire_results,
        auto_committed,
    }))
}

/// Commit one model's result from a pending set onto its scene.
async fn select_result(
    State(app): State<Arc<App>>,
    Path((id, _index)): Path<(Uuid, usize)>,
    Json(request): Json<SelectResultRequest>,
) -> Result<Json<Scene>, ApiError> {
    let result_set_id = Uuid::parse_str(&request.result_set_id)
        .map(ResultSetId::from_uuid)
        .map_err(|_| ApiError::BadRequest("invalid result set id".to_string()))?;

    // Only a committed choice consumes the set; a rejected one goes back
    let result_set = app.pending.take(result_set_id).ok_or(ApiError::NotFound)?;
    let selection = app
        .selector
        .select(
            ProjectId::from_uuid(id),
            &result_set,
            &ModelId::from(request.model.as_str()),
        )
        .await;
    match selection {
        Ok(scene) => Ok(Json(scene)),
        Err(error) => {
            app.pending.insert(result_set);
            Err(error.into())
        }
    }
}

// =============================================================================
// Wire mapping
// =============================================================================

fn wire_image(image: &WireImage) -> ImageData {
    ImageData::new(image.base64.clone(), image.mime_type.clone())
}

/// Parse a `data:<mime>;base64,<payload>` URL into inline image data.
fn parse_data_url(data_url: &str) -> Result<ImageData, ApiError> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| ApiError::BadRequest("start frame must be a data URL".to_string()))?;
    let (mime, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| ApiError::BadRequest("start frame data URL must be base64".to_string()))?;
    Ok(ImageData::new(payload, mime))
}

fn model_result(result: &VideoGenerationResult) -> ModelResult {
    match &result.outcome {
        Ok(artifact) => ModelResult {
            model: result.model.to_string(),
            video_url: artifact.url.clone(),
            video_bytes: artifact.data.as_ref().map(|data| BASE64.encode(data)),
            mime_type: Some(artifact.mime_type.clone()),
            error: None,
            elapsed_ms: result.elapsed.as_millis() as u64,
        },
        Err(error) => ModelResult {
            model: result.model.to_string(),
            video_url: None,
            video_bytes: None,
            mime_type: None,
            error: Some(WireGenerationError::from(error.clone())),
            elapsed_ms: result.elapsed.as_millis() as u64,
        },
    }
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    BadRequest(String),
    /// Unrecognized model id; carries the recognized set for the client.
    UnknownModel {
        message: String,
        valid_models: Vec<String>,
    },
    Conflict(String),
    Internal(String),
}

impl From<OrchestrateError> for ApiError {
    fn from(error: OrchestrateError) -> Self {
        match error {
            OrchestrateError::NoModels | OrchestrateError::MissingPrompt => {
                Self::BadRequest(error.to_string())
            }
            OrchestrateError::UnknownModel { ref valid, .. } => Self::UnknownModel {
                message: error.to_string(),
                valid_models: valid.iter().map(|m| m.to_string()).collect(),
            },
            // A requested vendor without credentials is a deployment problem
            OrchestrateError::MissingCredentials(_) => Self::Internal(error.to_string()),
        }
    }
}

impl From<ResolveError> for ApiError {
    fn from(error: ResolveError) -> Self {
        match error {
            ResolveError::InvalidFirstScene => Self::BadRequest(error.to_string()),
            ResolveError::SceneOutOfBounds { .. } => Self::NotFound,
            ResolveError::AssetStore(_) => Self::Internal(error.to_string()),
        }
    }
}

impl From<SelectError> for ApiError {
    fn from(error: SelectError) -> Self {
        match error {
            SelectError::UnknownModel(_) | SelectError::NotSelectable(_) => {
                Self::BadRequest(error.to_string())
            }
            SelectError::SceneNotFound => Self::NotFound,
            SelectError::Repo(ref repo) if repo.is_not_found() => Self::NotFound,
            SelectError::Repo(_) | SelectError::Media(_) => Self::Internal(error.to_string()),
        }
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            Self::NotFound => (
                axum::http::StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: "Not found".to_string(),
                    valid_models: None,
                },
            ),
            Self::BadRequest(message) => (
                axum::http::StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: message,
                    valid_models: None,
                },
            ),
            Self::UnknownModel {
                message,
                valid_models,
            } => (
                axum::http::StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: message,
                    valid_models: Some(valid_models),
                },
            ),
            Self::Conflict(message) => (
                axum::http::StatusCode::CONFLICT,
                ErrorResponse {
                    error: message,
                    valid_models: None,
                },
            ),
            Self::Internal(message) => {
                tracing::error!(error = %message, "request failed");
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: message,
                        valid_models: None,
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use storyreel_domain::{GenerationError, GenerationErrorKind, VendorFamily, VideoArtifact};

    use crate::ports::{
        MockAssetStorePort, MockFrameExtractorPort, MockMediaStorePort, MockProjectRepo,
        ModelRegistryPort, VideoGenError, VideoGenPort, VideoRequest,
    };

    struct StubAdapter {
        outcome: Result<VideoArtifact, VideoGenError>,
    }

    #[async_trait]
    impl VideoGenPort for StubAdapter {
        async fn generate(&self, _request: VideoRequest) -> Result<VideoArtifact, VideoGenError> {
            self.outcome.clone()
        }
    }

    struct StubRegistry {
        entries: HashMap<ModelId, Arc<dyn VideoGenPort>>,
    }

    impl ModelRegistryPort for StubRegistry {
        fn adapter(&self, model: &ModelId) -> Option<Arc<dyn VideoGenPort>> {
            self.entries.get(model).cloned()
        }

        fn family(&self, model: &ModelId) -> Option<VendorFamily> {
            self.entries.get(model).map(|_| VendorFamily::Google)
        }

        fn valid_models(&self) -> Vec<ModelId> {
            let mut models: Vec<ModelId> = self.entries.keys().cloned().collect();
            models.sort_by(|a, b| a.as_str().cmp(b.as_str()));
            models
        }

        fn has_credentials(&self, _family: VendorFamily) -> bool {
            true
        }
    }

    fn registry_with(models: Vec<(&str, Result<VideoArtifact, VideoGenError>)>) -> StubRegistry {
        StubRegistry {
            entries: models
                .into_iter()
                .map(|(id, outcome)| {
                    (
                        ModelId::from(id),
                        Arc::new(StubAdapter { outcome }) as Arc<dyn VideoGenPort>,
                    )
                })
                .collect(),
        }
    }

    fn app_with(repo: MockProjectRepo, registry: StubRegistry) -> Arc<App> {
        let mut media = MockMediaStorePort::new();
        media
            .expect_store_video()
            .returning(|scene_id, _| Ok(format!("videos/{scene_id}.mp4")));
        media.expect_store_frame().returning(|_, label, _| {
            Ok(storyreel_domain::FrameRef::new(format!(
                "frames/{label}.png"
            )))
        });
        let mut extractor = MockFrameExtractorPort::new();
        extractor
            .expect_extract()
            .returning(|_, _| Ok(ImageData::new("ZnJhbWU=", "image/png")));
        let mut assets = MockAssetStorePort::new();
        assets.expect_list_by_project().returning(|_| Ok(vec![]));
        assets.expect_get().returning(|_| Ok(None));

        Arc::new(App::new(
            Arc::new(repo),
            Arc::new(assets),
            Arc::new(media),
            Arc::new(extractor),
            Arc::new(registry),
        ))
    }

    fn router(app: Arc<App>) -> Router {
        routes().with_state(app)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn health_endpoint_responds() {
        let app = app_with(MockProjectRepo::new(), registry_with(vec![]));
        let response = router(app)
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_model_returns_400_with_the_valid_set() {
        let registry = registry_with(vec![(
            "veo-3.1",
            Ok(VideoArtifact::from_url("https://cdn.example/a.mp4", "video/mp4")),
        )]);
        let app = app_with(MockProjectRepo::new(), registry);

        let response = router(app)
            .oneshot(post_json(
                "/generate-video-multi",
                serde_json::json!({"models": ["veo-99"], "prompt": "a lighthouse"}),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["validModels"], serde_json::json!(["veo-3.1"]));
    }

    #[tokio::test]
    async fn multi_generate_keeps_results_aligned_on_partial_failure() {
        let registry = registry_with(vec![
            (
                "veo-3.1",
                Ok(VideoArtifact::from_url("https://cdn.example/a.mp4", "video/mp4")),
            ),
            (
                "sora-turbo",
                Err(VideoGenError::ContentPolicy {
                    message: "flagged".to_string(),
                    flagged_input: Some("prompt".to_string()),
                }),
            ),
        ]);
        let app = app_with(MockProjectRepo::new(), registry);

        let response = router(app)
            .oneshot(post_json(
                "/generate-video-multi",
                serde_json::json!({
                    "models": ["veo-3.1", "sora-turbo"],
                    "prompt": "a lighthouse at dusk"
                }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let results = body["results"].as_array().expect("results");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["model"], "veo-3.1");
        assert_eq!(results[0]["videoUrl"], "https://cdn.example/a.mp4");
        assert_eq!(results[1]["model"], "sora-turbo");
        assert_eq!(results[1]["error"]["kind"], "contentPolicy");
    }

    #[tokio::test]
    async fn scene_generate_404s_for_a_missing_project() {
        let mut repo = MockProjectRepo::new();
        repo.expect_get().returning(|_| Ok(None));
        let app = app_with(repo, registry_with(vec![]));

        let response = router(app)
            .oneshot(post_json(
                &format!("/api/projects/{}/scenes/0/generate", Uuid::new_v4()),
                serde_json::json!({}),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn single_model_scene_generate_auto_commits() {
        let project = Project::new("story", ModelId::from("veo-3.1"))
            .with_scenes(vec![storyreel_domain::Scene::new("a quiet harbor", 6.0)]);
        let project_id = project.id;

        let mut repo = MockProjectRepo::new();
        let stored = project.clone();
        repo.expect_get()
            .returning(move |_| Ok(Some(stored.clone())));
        repo.expect_save().returning(|_| Ok(()));

        let registry = registry_with(vec![(
            "veo-3.1",
            Ok(VideoArtifact::from_url("https://cdn.example/a.mp4", "video/mp4")),
        )]);
        let app = app_with(repo, registry);

        let response = router(app.clone())
            .oneshot(post_json(
                &format!("/api/projects/{project_id}/scenes/0/generate"),
                serde_json::json!({}),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["autoCommitted"], true);
        assert_eq!(body["results"].as_array().map(Vec::len), Some(1));
        // Committed immediately, nothing parked for selection
        assert!(app.pending.is_empty());
    }

    #[tokio::test]
    async fn selecting_an_unknown_result_set_404s() {
        let mut repo = MockProjectRepo::new();
        repo.expect_get().returning(|_| Ok(None));
        let app = app_with(repo, registry_with(vec![]));

        let response = router(app)
            .oneshot(post_json(
                &format!("/api/projects/{}/scenes/0/select", Uuid::new_v4()),
                serde_json::json!({
                    "resultSetId": Uuid::new_v4().to_string(),
                    "model": "veo-3.1"
                }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn rejected_selection_keeps_the_set_pending() {
        let project = Project::new("story", ModelId::from("veo-3.1"))
            .with_scenes(vec![storyreel_domain::Scene::new("a quiet harbor", 6.0)]);
        let project_id = project.id;
        let scene_id = project.scenes[0].id;

        let mut repo = MockProjectRepo::new();
        let stored = project.clone();
        repo.expect_get()
            .returning(move |_| Ok(Some(stored.clone())));
        repo.expect_save().returning(|_| Ok(()));
        let app = app_with(repo, registry_with(vec![]));

        let set = ResultSet::new(
            scene_id,
            vec![
                VideoGenerationResult::success(
                    ModelId::from("veo-3.1"),
                    VideoArtifact::from_url("https://cdn.example/a.mp4", "video/mp4"),
                    std::time::Duration::from_secs(4),
                ),
                VideoGenerationResult::failure(
                    ModelId::from("sora-turbo"),
                    GenerationError::new(GenerationErrorKind::Timeout, "deadline"),
                    std::time::Duration::from_secs(30),
                ),
            ],
        );
        let set_id = app.pending.insert(set);
        let uri = format!("/api/projects/{project_id}/scenes/0/select");

        // Choosing the failed sibling is rejected and leaves the set parked
        let rejected = router(app.clone())
            .oneshot(post_json(
                &uri,
                serde_json::json!({"resultSetId": set_id.to_string(), "model": "sora-turbo"}),
            ))
            .await
            .expect("response");
        assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
        assert!(!app.pending.is_empty());

        let committed = router(app.clone())
            .oneshot(post_json(
                &uri,
                serde_json::json!({"resultSetId": set_id.to_string(), "model": "veo-3.1"}),
            ))
            .await
            .expect("response");
        assert_eq!(committed.status(), StatusCode::OK);
        assert!(app.pending.is_empty());
    }

    #[tokio::test]
    async fn creating_an_invalid_project_is_rejected() {
        let mut repo = MockProjectRepo::new();
        repo.expect_save().returning(|_| Ok(()));
        let app = app_with(repo, registry_with(vec![]));

        let invalid = serde_json::json!({
            "id": Uuid::new_v4().to_string(),
            "name": "   ",
            "aspectRatio": "16:9",
            "defaultModel": "veo-3.1",
            "defaultResolution": "720p",
            "scenes": [],
            "characterReferenceIds": []
        });
        let response = router(app)
            .oneshot(post_json("/api/projects", invalid))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn data_urls_parse_into_inline_images() {
        let image = parse_data_url("data:image/png;base64,aGVsbG8=").expect("parse");
        assert_eq!(image.media_type, "image/png");
        assert_eq!(image.data, "aGVsbG8=");

        assert!(parse_data_url("https://example.com/image.png").is_err());
        assert!(parse_data_url("data:image/png,rawpayload").is_err());
    }
}
