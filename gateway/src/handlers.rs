use axum::http::StatusCode;
use axum::response::Response;
use serde_json::json;

pub async fn health() -> Response {
    petcare_common::envelope::respond(StatusCode::OK, json!({ "status": "ok", "service": "gateway" }))
}
