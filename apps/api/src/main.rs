mod cache;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod routes;
mod state;
mod talent;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cache::SystemClock;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::talent::directory::EmployeeDirectory;
use crate::talent::narrative::NarrativeGenerator;
use crate::talent::store::PgTalentStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; missing credentials stop us before any network call
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Talent Match API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url, config.db_acquire_timeout).await?;
    let store = Arc::new(PgTalentStore::new(db));

    // Initialize LLM client (optional)
    info!("AI insights enabled: {}", config.narrative_enabled());
    let narrator: Option<Arc<dyn NarrativeGenerator>> = match &config.anthropic_api_key {
        Some(key) => {
            let llm: Arc<dyn NarrativeGenerator> = Arc::new(
                LlmClient::new(key.clone()).context("Failed to build LLM HTTP client")?,
            );
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(llm)
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; AI insights are disabled");
            None
        }
    };

    // Subject directory cache
    let directory = Arc::new(EmployeeDirectory::new(
        config.directory_cache_ttl,
        Arc::new(SystemClock),
    ));
    info!(
        "Employee directory cache TTL: {}s",
        config.directory_cache_ttl.as_secs()
    );

    // Build app state
    let state = AppState {
        store,
        narrator,
        directory,
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
