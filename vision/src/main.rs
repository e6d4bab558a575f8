mod classifiers;
mod config;
mod crossbreed;
mod handlers;
mod image;
mod models;
mod pipeline;
mod retrieval;
mod state;
mod vlm;

use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    petcare_common::config::init_tracing("vision");

    let config = Config::from_env();
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state = AppState::new(config)?;

    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/vision/analyze", post(handlers::analyze))
        .route("/api/v1/rag/query", post(handlers::rag_query))
        .route("/api/v1/rag/ingest", post(handlers::rag_ingest))
        .route("/api/v1/rag/status", get(handlers::rag_status))
        .route("/api/v1/admin/rag/initialize", post(handlers::admin_rag_initialize))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!(%addr, "vision orchestrator listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
