use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use petcare_common::context::HEADER_USER_ID;
use petcare_common::envelope::Envelope;
use petcare_common::error::{ApiError, ApiResult};

use crate::cookies::{
    clear_access_cookie, clear_refresh_cookie, read_cookie, set_access_cookie, set_refresh_cookie,
    ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME,
};
use crate::jwt::{hash_refresh_token, TokenError};
use crate::models::{
    AccessClaims, ChangePasswordRequest, Identity, IdentityView, LoginRequest, RefreshRecord,
    RegisterRequest,
};
use crate::password::{hash_password, meets_policy, verify_password};
use crate::state::AppState;

fn token_error_to_api(err: TokenError) -> ApiError {
    match err {
        TokenError::Expired => ApiError::TokenExpired,
        TokenError::Invalid => ApiError::InvalidToken,
    }
}

async fn issue_tokens(state: &AppState, identity: &Identity) -> ApiResult<(String, String)> {
    let token_id = Uuid::new_v4();
    let refresh_ttl = state.config.refresh_token_ttl.as_secs() as i64;
    let access_ttl = state.config.access_token_ttl.as_secs() as i64;

    let refresh_token = state
        .jwt
        .issue_refresh(identity.id, token_id, refresh_ttl)
        .map_err(ApiError::internal)?;
    let access_token = state
        .jwt
        .issue_access(identity.id, &identity.email, &identity.role, access_ttl)
        .map_err(ApiError::internal)?;

    let now = Utc::now();
    let record = RefreshRecord {
        id: token_id,
        owner: identity.id,
        token_hash: hash_refresh_token(&refresh_token),
        created_at: now,
        expires_at: now + chrono::Duration::seconds(refresh_ttl),
        last_used_at: None,
        revoked: false,
    };
    state
        .store
        .insert_refresh_record(&record)
        .map_err(ApiError::internal)?;

    Ok((access_token, refresh_token))
}

fn attach_auth_cookies(state: &AppState, response: &mut Response, access: &str, refresh: &str) {
    let access_cookie = set_access_cookie(&state.config, access, state.config.access_token_ttl.as_secs() as i64);
    let refresh_cookie =
        set_refresh_cookie(&state.config, refresh, state.config.refresh_token_ttl.as_secs() as i64);
    let headers = response.headers_mut();
    if let Ok(v) = header::HeaderValue::from_str(&access_cookie) {
        headers.append(header::SET_COOKIE, v);
    }
    if let Ok(v) = header::HeaderValue::from_str(&refresh_cookie) {
        headers.append(header::SET_COOKIE, v);
    }
}

fn attach_clear_cookies(state: &AppState, response: &mut Response) {
    let headers = response.headers_mut();
    if let Ok(v) = header::HeaderValue::from_str(&clear_access_cookie(&state.config)) {
        headers.append(header::SET_COOKIE, v);
    }
    if let Ok(v) = header::HeaderValue::from_str(&clear_refresh_cookie(&state.config)) {
        headers.append(header::SET_COOKIE, v);
    }
}

fn decode_access_claims(state: &AppState, headers: &HeaderMap) -> ApiResult<AccessClaims> {
    let cookie_header = headers.get(header::COOKIE).and_then(|v| v.to_str().ok());
    let token = read_cookie(cookie_header, ACCESS_COOKIE_NAME).ok_or(ApiError::MissingToken)?;
    let claims = state
        .jwt
        .decode_access(&token)
        .map_err(token_error_to_api)?;
    if claims.token_type != "access" {
        return Err(ApiError::InvalidToken);
    }
    Ok(claims)
}

fn load_active_identity(state: &AppState, user_id: Uuid) -> ApiResult<Identity> {
    let identity = state
        .store
        .find_by_id(user_id)
        .map_err(ApiError::internal)?
        .ok_or(ApiError::InvalidToken)?;
    if !identity.active {
        return Err(ApiError::AccountDisabled);
    }
    Ok(identity)
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Response> {
    let email = req.email.trim().to_string();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::Validation("a valid email is required".into()));
    }
    if !meets_policy(&req.password) {
        return Err(ApiError::Validation(
            "password must be at least 8 characters and include a letter and a digit".into(),
        ));
    }
    if state.store.email_taken(&email).map_err(ApiError::internal)? {
        return Err(ApiError::EmailAlreadyExists);
    }

    let password_hash = hash_password(&req.password).map_err(ApiError::internal)?;
    let identity = Identity::new(email, password_hash);
    state
        .store
        .create_identity(&identity)
        .map_err(ApiError::internal)?;

    let (access, refresh) = issue_tokens(&state, &identity).await?;
    let body = Envelope::success(json!({ "user": IdentityView::from(&identity) }));
    let mut response = (StatusCode::CREATED, body).into_response();
    attach_auth_cookies(&state, &mut response, &access, &refresh);
    Ok(response)
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Response> {
    let identity = state
        .store
        .find_by_email(&req.email)
        .map_err(ApiError::internal)?;
    // Identical error for "no such user" and "wrong password" to avoid
    // leaking which emails are registered.
    let identity = identity.ok_or(ApiError::InvalidCredentials)?;
    if !verify_password(&req.password, &identity.password_hash) {
        return Err(ApiError::InvalidCredentials);
    }
    if !identity.active {
        return Err(ApiError::AccountDisabled);
    }

    let lock = state.store.identity_lock(identity.id);
    let _guard = lock.lock().await;
    state
        .store
        .revoke_all_for_owner(identity.id)
        .map_err(ApiError::internal)?;
    let (access, refresh) = issue_tokens(&state, &identity).await?;
    drop(_guard);

    let body = Envelope::success(json!({ "user": IdentityView::from(&identity) }));
    let mut response = (StatusCode::OK, body).into_response();
    attach_auth_cookies(&state, &mut response, &access, &refresh);
    Ok(response)
}

pub async fn refresh(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let cookie_header = headers.get(header::COOKIE).and_then(|v| v.to_str().ok());
    let presented = read_cookie(cookie_header, REFRESH_COOKIE_NAME).ok_or(ApiError::MissingToken)?;

    let claims = state
        .jwt
        .decode_refresh(&presented)
        .map_err(token_error_to_api)?;
    if claims.token_type != "refresh" {
        return Err(ApiError::InvalidToken);
    }

    let record = state
        .store
        .get_refresh_record(claims.token_id)
        .map_err(ApiError::internal)?
        .ok_or(ApiError::InvalidToken)?;
    if record.revoked {
        return Err(ApiError::TokenRevoked);
    }
    if record.token_hash != hash_refresh_token(&presented) {
        return Err(ApiError::InvalidToken);
    }

    let identity = state
        .store
        .find_by_id(claims.user_id)
        .map_err(ApiError::internal)?
        .ok_or(ApiError::InvalidToken)?;
    if !identity.active {
        return Err(ApiError::AccountDisabled);
    }

    let lock = state.store.identity_lock(identity.id);
    let _guard = lock.lock().await;
    // Re-check revocation under the lock: a concurrent refresh for the same
    // token may have already won the race.
    let record = state
        .store
        .get_refresh_record(claims.token_id)
        .map_err(ApiError::internal)?
        .ok_or(ApiError::InvalidToken)?;
    if record.revoked {
        return Err(ApiError::TokenRevoked);
    }
    state
        .store
        .revoke_record(claims.token_id)
        .map_err(ApiError::internal)?;
    let (access, refresh_token) = issue_tokens(&state, &identity).await?;
    drop(_guard);

    let body = Envelope::success(json!({ "user": IdentityView::from(&identity) }));
    let mut response = (StatusCode::OK, body).into_response();
    attach_auth_cookies(&state, &mut response, &access, &refresh_token);
    Ok(response)
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookie_header = headers.get(header::COOKIE).and_then(|v| v.to_str().ok());
    if let Some(presented) = read_cookie(cookie_header, REFRESH_COOKIE_NAME) {
        if let Ok(claims) = state.jwt.decode_refresh(&presented) {
            if claims.token_type == "refresh" {
                let _ = state.store.revoke_record(claims.token_id);
            }
        }
    }

    let body = Envelope::success(json!({ "message": "Successfully logged out" }));
    let mut response = (StatusCode::OK, body).into_response();
    attach_clear_cookies(&state, &mut response);
    response
}

pub async fn verify(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let claims = decode_access_claims(&state, &headers)?;
    let identity = load_active_identity(&state, claims.user_id)?;
    Ok(petcare_common::envelope::respond(
        StatusCode::OK,
        json!({ "user": IdentityView::from(&identity), "valid": true }),
    ))
}

pub async fn change_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Response> {
    let claims = decode_access_claims(&state, &headers)?;
    let mut identity = load_active_identity(&state, claims.user_id)?;

    if !verify_password(&req.current_password, &identity.password_hash) {
        return Err(ApiError::InvalidCredentials);
    }
    if !meets_policy(&req.new_password) {
        return Err(ApiError::Validation(
            "password must be at least 8 characters and include a letter and a digit".into(),
        ));
    }

    identity.password_hash = hash_password(&req.new_password).map_err(ApiError::internal)?;
    identity.updated_at = Utc::now();
    state
        .store
        .save_identity(&identity)
        .map_err(ApiError::internal)?;

    let lock = state.store.identity_lock(identity.id);
    let _guard = lock.lock().await;
    state
        .store
        .revoke_all_for_owner(identity.id)
        .map_err(ApiError::internal)?;
    let (access, refresh_token) = issue_tokens(&state, &identity).await?;
    drop(_guard);

    let body = Envelope::success(json!({ "user": IdentityView::from(&identity) }));
    let mut response = (StatusCode::OK, body).into_response();
    attach_auth_cookies(&state, &mut response, &access, &refresh_token);
    Ok(response)
}

pub async fn delete_self(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let claims = decode_access_claims(&state, &headers)?;
    let identity = load_active_identity(&state, claims.user_id)?;

    let summary: serde_json::Value = state
        .user_data
        .delete_json(
            "/api/v1/users/delete",
            &[(HEADER_USER_ID, identity.id.to_string())],
        )
        .await
        .map_err(|e| ApiError::DeletionFailed(e.to_string()))?;

    state
        .store
        .delete_identity(identity.id)
        .map_err(ApiError::internal)?;

    let body = Envelope::success(json!({ "message": "Account deleted", "deletion_summary": summary }));
    let mut response = (StatusCode::OK, body).into_response();
    attach_clear_cookies(&state, &mut response);
    Ok(response)
}

pub async fn health() -> Response {
    petcare_common::envelope::respond(
        StatusCode::OK,
        json!({ "status": "ok", "service": "identity" }),
    )
}
