use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde_json::json;

use petcare_common::envelope::{respond, respond_empty};
use petcare_common::error::{ApiError, ApiResult};

use crate::models::{AnalyzeRequest, IngestRequest, RagQueryRequest, RagSource};
use crate::state::AppState;

pub async fn analyze(State(state): State<AppState>, Json(req): Json<AnalyzeRequest>) -> ApiResult<Response> {
    let report = state.pipeline.analyze(&req.image).await?;
    Ok(respond(StatusCode::OK, report))
}

pub async fn rag_query(State(state): State<AppState>, Json(req): Json<RagQueryRequest>) -> ApiResult<Response> {
    let top_k = req.top_k.unwrap_or(state.config.rag_top_k);
    let chunks = state
        .retrieval
        .search(&req.embedding, top_k, req.breed_filter.as_deref())
        .map_err(ApiError::internal)?;

    let sources: Vec<RagSource> = chunks
        .into_iter()
        .map(|c| RagSource {
            content: c.content,
            source_file: c.source_file,
            relevance_score: 1.0,
        })
        .collect();

    Ok(respond(StatusCode::OK, json!({ "query": req.query, "sources": sources })))
}

pub async fn rag_ingest(State(state): State<AppState>, Json(req): Json<IngestRequest>) -> ApiResult<Response> {
    let count = state.retrieval.ingest(req.chunks).map_err(ApiError::internal)?;
    Ok(respond(StatusCode::CREATED, json!({ "ingested": count })))
}

pub async fn rag_status(State(state): State<AppState>) -> ApiResult<Response> {
    Ok(respond(StatusCode::OK, json!({ "chunk_count": state.retrieval.count() })))
}

/// Bulk reindex trigger. Restricted to loopback/private callers since it can
/// rebuild the whole retrieval index and has no end-user purpose.
pub async fn admin_rag_initialize(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
    Json(req): Json<IngestRequest>,
) -> ApiResult<Response> {
    if !is_private_address(&addr) {
        return Err(ApiError::Forbidden);
    }
    let count = state.retrieval.ingest(req.chunks).map_err(ApiError::internal)?;
    Ok(respond(StatusCode::OK, json!({ "ingested": count })))
}

fn is_private_address(addr: &SocketAddr) -> bool {
    match addr.ip() {
        std::net::IpAddr::V4(ip) => ip.is_loopback() || ip.is_private(),
        std::net::IpAddr::V6(ip) => ip.is_loopback(),
    }
}

pub async fn health() -> Response {
    respond_empty(StatusCode::OK)
}
