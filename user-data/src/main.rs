mod config;
mod handlers;
mod models;
mod state;
mod store;

use std::net::SocketAddr;

use axum::routing::{delete, get};
use axum::Router;
use tower_http::trace::TraceLayer;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    petcare_common::config::init_tracing("user-data");

    let config = Config::from_env();
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state = AppState::new(config)?;

    let app = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/v1/users/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .route("/api/v1/users/delete", delete(handlers::delete_user))
        .route("/api/v1/pets", get(handlers::list_pets).post(handlers::create_pet))
        .route(
            "/api/v1/pets/:pet_id",
            get(handlers::get_pet).put(handlers::update_pet).delete(handlers::delete_pet),
        )
        .route(
            "/api/v1/analyses",
            get(handlers::list_analyses).post(handlers::create_analysis),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!(%addr, "user-data service listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
