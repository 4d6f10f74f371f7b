use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use essay_api::config::Config;
use essay_api::db::create_pool;
use essay_api::llm_client::{DashScopeClient, LanguageModel};
use essay_api::ocr::{TesseractCli, TextRecognizer};
use essay_api::reference::ReferenceData;
use essay_api::routes::build_router;
use essay_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("essay_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting essay API v{}", env!("CARGO_PKG_VERSION"));
    if config.uses_default_secret() {
        warn!("SECRET_KEY is not set, falling back to the development key");
    }

    // Initialize SQLite
    let db = create_pool(&config.database_url, config.database_max_connections).await?;

    // Initialize LLM client
    let llm = DashScopeClient::new(
        config.dashscope_api_key.clone(),
        &config.dashscope_base_url,
        config.dashscope_model.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    )?;
    info!("LLM client initialized (model: {})", llm.model_name());

    // OCR is optional
    let ocr = TesseractCli::detect()
        .await
        .map(|engine| Arc::new(engine) as Arc<dyn TextRecognizer>);
    if ocr.is_none() {
        warn!("Tesseract OCR not available; /api/ocr will answer 503");
    }

    let reference = ReferenceData::new(config.reference_data_dir.clone());
    info!("Reference data directory: {}", reference.dir().display());

    // Build app state
    let state = AppState {
        db,
        llm: Arc::new(llm),
        ocr,
        reference,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
