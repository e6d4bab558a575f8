mod config;
mod cookies;
mod handlers;
mod jwt;
mod models;
mod password;
mod state;
mod store;

use std::net::SocketAddr;
use std::time::Duration;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    petcare_common::config::init_tracing("identity");

    let config = Config::from_env();
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state = AppState::new(config)?;

    spawn_refresh_record_reaper(state.clone());

    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/auth/register", post(handlers::register))
        .route("/api/v1/auth/login", post(handlers::login))
        .route("/api/v1/auth/refresh", post(handlers::refresh))
        .route("/api/v1/auth/logout", post(handlers::logout))
        .route("/api/v1/auth/verify", get(handlers::verify))
        .route("/api/v1/auth/change-password", put(handlers::change_password))
        .route("/api/v1/auth/delete", delete(handlers::delete_self))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!(%addr, "identity service listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Periodically prunes expired refresh records, modeled on a low-frequency
/// background sweep rather than any request-triggered cleanup.
fn spawn_refresh_record_reaper(state: AppState) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(300));
        loop {
            ticker.tick().await;
            match state.store.prune_expired() {
                Ok(pruned) if pruned > 0 => {
                    tracing::info!(pruned, "reaped expired refresh records");
                }
                Ok(_) => {}
                Err(err) => tracing::error!(error = %err, "failed to prune refresh records"),
            }
        }
    });
}
