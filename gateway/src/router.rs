//! Path-prefix routing table and the reverse-proxy handler that forwards a
//! request to the resolved backend, rewriting headers and carrying every
//! `Set-Cookie` the backend emitted back onto the outbound response.
//!
//! By the time a request reaches `proxy`, the auth middleware has already
//! injected `X-User-ID`/`X-User-Role` into its headers when applicable — this
//! handler only has to drop `Host`/`Cookie` and stamp the request/correlation
//! id before forwarding everything else verbatim.

use axum::body::{to_bytes, Body};
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use petcare_common::context::{HEADER_CORRELATION_ID, HEADER_REQUEST_ID};
use petcare_common::error::ApiError;

use crate::state::AppState;

const MAX_PROXIED_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Ordered longest-prefix-first so `/api/v1/admin/rag` and
/// `/api/v1/admin/products` resolve ahead of any broader `/api/v1/admin`
/// grouping (there isn't one — each admin surface belongs to a specific
/// backend).
const PREFIXES: &[&str] = &[
    "/api/v1/admin/rag",
    "/api/v1/admin/products",
    "/api/v1/auth",
    "/api/v1/users",
    "/api/v1/pets",
    "/api/v1/analyses",
    "/api/v1/vision",
    "/api/v1/rag",
    "/api/v1/recommendations",
];

fn resolve_target<'a>(config: &'a crate::config::Config, path: &str) -> Option<&'a str> {
    let matched = PREFIXES
        .iter()
        .filter(|prefix| path.starts_with(**prefix))
        .max_by_key(|prefix| prefix.len())?;

    Some(match *matched {
        "/api/v1/auth" => &config.identity_url,
        "/api/v1/users" | "/api/v1/pets" | "/api/v1/analyses" => &config.user_data_url,
        "/api/v1/vision" | "/api/v1/rag" | "/api/v1/admin/rag" => &config.vision_url,
        "/api/v1/recommendations" | "/api/v1/admin/products" => &config.recommendation_url,
        _ => unreachable!(),
    })
}

pub async fn proxy(State(state): State<AppState>, method: Method, uri: Uri, headers: HeaderMap, body: Body) -> Response {
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or_else(|| uri.path());

    let Some(target_base) = resolve_target(&state.config, uri.path()) else {
        return ApiError::NotFound.into_response();
    };

    let body_bytes = match to_bytes(body, MAX_PROXIED_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => return ApiError::Validation("request body too large".into()).into_response(),
    };

    let url = format!("{}{}", target_base.trim_end_matches('/'), path_and_query);
    let mut outbound = state.http.request(method, &url);

    for (name, value) in headers.iter() {
        if name == axum::http::header::HOST || name == axum::http::header::COOKIE {
            continue;
        }
        outbound = outbound.header(name, value);
    }

    let request_id = headers
        .get(HEADER_REQUEST_ID)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_str(&uuid::Uuid::new_v4().to_string()).expect("uuid is valid header value"));
    outbound = outbound.header(HEADER_REQUEST_ID, request_id.clone());
    outbound = outbound.header(HEADER_CORRELATION_ID, request_id);
    outbound = outbound.body(body_bytes.to_vec());

    let response = match outbound.send().await {
        Ok(r) => r,
        Err(_) => return ApiError::ServiceUnavailable(target_base.to_string()).into_response(),
    };

    let status = StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut set_cookies: Vec<HeaderValue> = Vec::new();
    for value in response.headers().get_all(reqwest::header::SET_COOKIE) {
        if let Ok(v) = HeaderValue::from_bytes(value.as_bytes()) {
            set_cookies.push(v);
        }
    }
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| HeaderValue::from_bytes(v.as_bytes()).ok());

    let bytes = match response.bytes().await {
        Ok(b) => b,
        Err(_) => return ApiError::ServiceUnavailable(target_base.to_string()).into_response(),
    };

    let mut out = Response::builder().status(status);
    if let Some(ct) = content_type {
        out = out.header(axum::http::header::CONTENT_TYPE, ct);
    }
    for cookie in set_cookies {
        out = out.header(axum::http::header::SET_COOKIE, cookie);
    }
    out.body(Body::from(bytes)).unwrap_or_else(|_| StatusCode::BAD_GATEWAY.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> crate::config::Config {
        crate::config::Config {
            host: "0.0.0.0".into(),
            port: 8001,
            jwt_public_key_path: "./keys/public.pem".into(),
            identity_url: "http://identity:8002".into(),
            user_data_url: "http://user-data:8005".into(),
            vision_url: "http://vision:8003".into(),
            recommendation_url: "http://recommendation:8004".into(),
            rate_limit_per_minute: 60,
            cors_allowed_origins: Vec::new(),
            cookie_domain: None,
            request_timeout: std::time::Duration::from_secs(10),
        }
    }

    #[test]
    fn routes_admin_rag_to_vision_not_recommendation() {
        let config = config();
        assert_eq!(resolve_target(&config, "/api/v1/admin/rag/initialize"), Some(config.vision_url.as_str()));
    }

    #[test]
    fn routes_admin_products_to_recommendation() {
        let config = config();
        assert_eq!(resolve_target(&config, "/api/v1/admin/products"), Some(config.recommendation_url.as_str()));
    }

    #[test]
    fn routes_pets_and_analyses_to_user_data() {
        let config = config();
        assert_eq!(resolve_target(&config, "/api/v1/pets/123"), Some(config.user_data_url.as_str()));
        assert_eq!(resolve_target(&config, "/api/v1/analyses/55"), Some(config.user_data_url.as_str()));
    }

    #[test]
    fn unmatched_path_resolves_to_none() {
        let config = config();
        assert_eq!(resolve_target(&config, "/api/v1/unknown"), None);
    }
}
