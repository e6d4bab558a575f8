mod config;
mod handlers;
mod middleware;
mod rate_limit;
mod router;
mod state;

use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    petcare_common::config::init_tracing("gateway");

    let config = Config::from_env();
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let cors = build_cors_layer(&config);
    let state = AppState::new(config)?;

    spawn_rate_limiter_reaper(state.clone());

    let app = Router::new()
        .route("/health", get(handlers::health))
        .fallback(router::proxy)
        .with_state(state.clone())
        .layer(axum::middleware::from_fn(middleware::normalize_response))
        .layer(axum::middleware::from_fn_with_state(state.clone(), middleware::authentication))
        .layer(axum::middleware::from_fn_with_state(state.clone(), middleware::rate_limit))
        .layer(axum::middleware::from_fn(middleware::request_logging))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    tracing::info!(%addr, "gateway listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}

/// Periodically drops stale rate-limit counters, modeled on the identity
/// service's refresh-record reaper.
fn spawn_rate_limiter_reaper(state: AppState) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            ticker.tick().await;
            let pruned = state.rate_limiter.prune_stale();
            if pruned > 0 {
                tracing::info!(pruned, "reaped stale rate-limit counters");
            }
        }
    });
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS];
    let expose_headers = [
        HeaderName::from_static("x-request-id"),
        HeaderName::from_static("x-ratelimit-limit"),
        HeaderName::from_static("x-ratelimit-remaining"),
    ];

    let mut layer = CorsLayer::new()
        .allow_methods(methods)
        .allow_headers(Any)
        .allow_credentials(true)
        .expose_headers(expose_headers);

    if config.cors_allowed_origins.is_empty() {
        layer
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| HeaderValue::from_str(o).ok())
            .collect();
        layer = layer.allow_origin(origins);
        layer
    }
}
