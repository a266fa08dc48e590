//! StoryReel Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod app;
mod config;
mod infrastructure;
mod ports;
mod use_cases;

use app::App;
use config::Settings;
use infrastructure::{
    FfmpegFrameExtractor, FsMediaStore, GeminiVeoClient, JsonProjectStore, ModelRegistry,
    OpenAiSoraClient,
};
use ports::{AssetStorePort, FrameExtractorPort, MediaStorePort, ProjectRepo, VideoGenPort};
use storyreel_domain::VendorFamily;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storyreel_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting StoryReel Engine");

    let settings = Settings::from_env();

    // Stores
    let store = Arc::new(JsonProjectStore::open(&settings.data_dir).await?);
    let repo: Arc<dyn ProjectRepo> = store.clone();
    let assets: Arc<dyn AssetStorePort> = store;
    let media: Arc<dyn MediaStorePort> = Arc::new(FsMediaStore::open(&settings.media_dir).await?);
    let extractor: Arc<dyn FrameExtractorPort> =
        Arc::new(FfmpegFrameExtractor::new(&settings.ffmpeg_binary));

    // Vendor adapters and the model registry
    let veo: Arc<dyn VideoGenPort> = Arc::new(GeminiVeoClient::new(
        &settings.gemini_base_url,
        settings.google_api_key.as_deref().unwrap_or_default(),
    ));
    let sora: Arc<dyn VideoGenPort> = Arc::new(OpenAiSoraClient::new(
        &settings.openai_base_url,
        settings.openai_api_key.as_deref().unwrap_or_default(),
    ));

    let mut registry = ModelRegistry::new()
        .register("veo-3.1", VendorFamily::Google, veo.clone())
        .register("veo-3.1-fast", VendorFamily::Google, veo)
        .register("sora-2", VendorFamily::OpenAi, sora.clone())
        .register("sora-turbo", VendorFamily::OpenAi, sora);
    if settings.google_api_key.is_some() {
        registry = registry.with_credentials(VendorFamily::Google);
    } else {
        tracing::warn!("GOOGLE_API_KEY not set, Veo models unavailable");
    }
    if settings.openai_api_key.is_some() {
        registry = registry.with_credentials(VendorFamily::OpenAi);
    } else {
        tracing::warn!("OPENAI_API_KEY not set, Sora models unavailable");
    }

    let app = Arc::new(App::with_frame_epsilon(
        repo,
        assets,
        media,
        extractor,
        Arc::new(registry),
        settings.frame_epsilon_secs,
    ));

    let mut router = api::http::routes()
        .with_state(app)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer_from_env() {
        router = router.layer(cors);
    }

    let addr: SocketAddr = format!("{}:{}", settings.server_host, settings.server_port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer_from_env() -> Option<CorsLayer> {
    let allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())?;

    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    if allowed_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}
