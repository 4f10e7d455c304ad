mod config;
mod credentials;
mod db;
mod errors;
mod export;
mod generation;
mod llm_client;
mod models;
mod routes;
mod sourcing;
mod state;
mod store;
mod tailoring;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::credentials::google::GoogleOAuthClient;
use crate::db::create_pool;
use crate::export::DriveDocumentStore;
use crate::llm_client::backends::build_backend;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::sourcing::JobSource;
use crate::state::AppState;
use crate::store::PgStore;

const DRIVE_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobFlow API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize LLM client. Blocking HTTP clients must be built off the runtime.
    let backend_config = config.clone();
    let backend = tokio::task::spawn_blocking(move || build_backend(&backend_config))
        .await
        .context("LLM backend setup task failed")??;
    let llm = LlmClient::new(backend)
        .with_timeout(Duration::from_secs(config.llm_timeout_secs))
        .with_max_retries(config.llm_max_retries);
    info!("LLM client initialized (backend: {})", llm.backend_name());

    // Job sourcing falls back to sample postings without a provider key
    let job_source = JobSource::from_config(&config);

    // Google OAuth + Drive export
    let oauth = Arc::new(GoogleOAuthClient::from_config(&config)?);
    let documents = Arc::new(DriveDocumentStore::new(DRIVE_TIMEOUT)?);

    // Build app state
    let state = AppState {
        store: Arc::new(PgStore::new(db)),
        llm,
        job_source,
        oauth,
        documents,
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
