mod config;
mod features;
mod handlers;
mod models;
mod reasons;
mod similarity;
mod state;
mod store;

use std::net::SocketAddr;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    petcare_common::config::init_tracing("recommendation");

    let config = Config::from_env();
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state = AppState::new(config)?;

    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/recommendations/food", get(handlers::food_recommendations))
        .route(
            "/api/v1/admin/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/api/v1/admin/products/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!(%addr, "recommendation service listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
