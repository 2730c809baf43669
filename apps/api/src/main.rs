mod auth;
mod config;
mod contracts;
mod dashboard;
mod db;
mod errors;
mod evaluation;
mod llm_client;
mod models;
mod proposals;
mod rfps;
mod routes;
mod state;
mod vendors;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::evaluation::evaluator::Evaluator;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Procurement API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize proposal evaluator; without a credential the rest of the API still serves
    let evaluator = match Evaluator::from_credential(
        config.openai_api_key.clone(),
        &config.openai_base_url,
        config.llm_timeout,
    ) {
        Ok(evaluator) => {
            info!("Proposal evaluator initialized (model: {})", llm_client::MODEL);
            Some(evaluator)
        }
        Err(e) => {
            warn!("Proposal evaluation disabled: {e}");
            None
        }
    };

    // Build app state
    let state = AppState {
        db,
        config: config.clone(),
        evaluator,
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
