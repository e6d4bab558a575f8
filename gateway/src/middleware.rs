//! The ordered middleware stack: CORS (built with `tower_http::cors::CorsLayer`
//! in `main.rs`) → request logging → rate limiting → authentication →
//! routing → response normalization. Each stage below is one `from_fn`
//! layer; `main.rs` applies them in reverse so the list above reads as
//! execution order.

use std::net::SocketAddr;

use axum::body::{to_bytes, Body};
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use uuid::Uuid;

use petcare_common::context::{HEADER_REQUEST_ID, HEADER_USER_ID, HEADER_USER_ROLE};
use petcare_common::envelope::Envelope;
use petcare_common::error::ApiError;
use petcare_common::jwt::verify_access_token;
use petcare_common::UserContext;

use crate::rate_limit::Decision;
use crate::state::AppState;

const PUBLIC_PATHS: &[&str] = &[
    "/health",
    "/api/v1/auth/login",
    "/api/v1/auth/register",
    "/api/v1/auth/refresh",
    "/docs",
    "/openapi.json",
];

fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.iter().any(|p| path == *p || path.starts_with(&format!("{p}/")))
}

pub async fn request_logging(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(HEADER_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        request.headers_mut().insert(HeaderName::from_static("x-request-id"), value.clone());
        request.headers_mut().insert(HeaderName::from_static("x-correlation-id"), value);
    }

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        request_id,
        %method,
        path,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "request handled"
    );

    response
}

/// Counts each request exactly once. Public paths are counted here by
/// client address, since no identity will ever be resolved for them;
/// protected paths are left uncounted here and are instead counted once by
/// `authentication`, under the caller's identity, once a token verifies.
pub async fn rate_limit(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if !is_public(request.uri().path()) {
        return next.run(request).await;
    }

    let principal = format!("ip:{}", addr.ip());
    let decision = state.rate_limiter.check_and_increment(&principal);

    if !decision.allowed {
        return rate_limited_response(&decision, state.config.rate_limit_per_minute);
    }

    let mut response = next.run(request).await;
    apply_rate_limit_headers(&mut response, &decision, state.config.rate_limit_per_minute);
    response
}

fn rate_limited_response(decision: &Decision, limit: u32) -> Response {
    ApiError::RateLimitExceeded {
        retry_after: decision.retry_after,
        limit,
    }
    .into_response()
}

fn apply_rate_limit_headers(response: &mut Response, decision: &Decision, limit: u32) {
    if let Ok(v) = HeaderValue::from_str(&limit.to_string()) {
        response.headers_mut().insert(HeaderName::from_static("x-ratelimit-limit"), v);
    }
    if let Ok(v) = HeaderValue::from_str(&decision.remaining.to_string()) {
        response.headers_mut().insert(HeaderName::from_static("x-ratelimit-remaining"), v);
    }
}

/// Reads the `access_token` cookie, verifies it, and on success injects the
/// identity headers backends trust and applies this request's sole
/// rate-limit increment, keyed by identity. Public paths skip verification
/// (and were already counted in `rate_limit`) entirely. Any failure to
/// extract or verify the token — missing cookie, expired signature, bad
/// signature, wrong token type — collapses to the same `UNAUTHORIZED`
/// response; the granular token error codes are an Identity-service-only
/// concern scoped to its own refresh endpoint.
pub async fn authentication(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    if is_public(&path) {
        return next.run(request).await;
    }

    let token = match extract_access_token(&request) {
        Some(t) => t,
        None => return ApiError::Unauthorized.into_response(),
    };

    let claims = match verify_access_token(&state.jwt_key, &token) {
        Ok(claims) => claims,
        Err(_) => return ApiError::Unauthorized.into_response(),
    };

    let ctx: UserContext = claims.into();

    let decision = state.rate_limiter.check_and_increment(&format!("user:{}", ctx.user_id));
    if !decision.allowed {
        return rate_limited_response(&decision, state.config.rate_limit_per_minute);
    }

    if let Ok(v) = HeaderValue::from_str(&ctx.user_id.to_string()) {
        request.headers_mut().insert(HeaderName::from_bytes(HEADER_USER_ID.as_bytes()).unwrap(), v);
    }
    if let Ok(v) = HeaderValue::from_str(&ctx.role) {
        request.headers_mut().insert(HeaderName::from_bytes(HEADER_USER_ROLE.as_bytes()).unwrap(), v);
    }
    request.extensions_mut().insert(ctx);

    let mut response = next.run(request).await;
    apply_rate_limit_headers(&mut response, &decision, state.config.rate_limit_per_minute);
    response
}

fn extract_access_token(request: &Request) -> Option<String> {
    let cookie_header = request.headers().get(axum::http::header::COOKIE)?.to_str().ok()?;
    cookie_header.split(';').find_map(|pair| {
        let pair = pair.trim();
        let (name, value) = pair.split_once('=')?;
        (name == "access_token").then(|| value.to_string())
    })
}

/// Ensures every response leaving the gateway is `{success, data, error,
/// timestamp}`. Conforming backend responses (the overwhelming majority,
/// since every backend speaks the same envelope) pass straight through;
/// anything else — a raw body, a transport-level error page — is wrapped.
pub async fn normalize_response(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let (parts, body) = response.into_parts();

    let bytes = match to_bytes(body, 20 * 1024 * 1024).await {
        Ok(b) => b,
        Err(_) => return Response::from_parts(parts, Body::empty()),
    };

    let already_conforms = serde_json::from_slice::<Value>(&bytes)
        .ok()
        .and_then(|v| v.as_object().map(|o| o.contains_key("success")))
        .unwrap_or(false);

    if already_conforms {
        return Response::from_parts(parts, Body::from(bytes));
    }

    let envelope = if parts.status.is_success() {
        let data = serde_json::from_slice::<Value>(&bytes).unwrap_or(Value::Null);
        Envelope::success(data)
    } else {
        let message = String::from_utf8_lossy(&bytes).to_string();
        Envelope::failure("UPSTREAM_ERROR", message, None)
    };

    let mut response = (parts.status, envelope).into_response();
    for cookie in parts.headers.get_all(axum::http::header::SET_COOKIE) {
        response.headers_mut().append(axum::http::header::SET_COOKIE, cookie.clone());
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_paths_match_exactly_or_as_a_prefix() {
        assert!(is_public("/health"));
        assert!(is_public("/api/v1/auth/login"));
        assert!(is_public("/openapi.json"));
        assert!(is_public("/docs/index.html"));
    }

    #[test]
    fn protected_paths_are_not_public() {
        assert!(!is_public("/api/v1/auth/logout"));
        assert!(!is_public("/api/v1/pets"));
        assert!(!is_public("/api/v1/users/me"));
    }

    #[test]
    fn extracts_access_token_from_cookie_header() {
        let request = Request::builder()
            .header(axum::http::header::COOKIE, "other=1; access_token=abc.def.ghi; foo=bar")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_access_token(&request), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn missing_cookie_header_yields_no_token() {
        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(extract_access_token(&request), None);
    }
}
