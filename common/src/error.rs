//! The closed error taxonomy shared by every service and the gateway.
//!
//! Each variant maps 1:1 onto an `error.code` string and an HTTP status. 5xx
//! variants never leak their internal cause to the response body — only to
//! the trace log.

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::envelope::Envelope;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    InvalidImage(String),
    #[error("not found")]
    NotFound,
    #[error("an account with this email already exists")]
    EmailAlreadyExists,
    #[error("authentication required")]
    Unauthorized,
    #[error("access token is required")]
    MissingToken,
    #[error("access token has expired")]
    TokenExpired,
    #[error("invalid access token")]
    InvalidToken,
    #[error("refresh token has been revoked")]
    TokenRevoked,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("account is disabled")]
    AccountDisabled,
    #[error("forbidden")]
    Forbidden,
    #[error("rate limit exceeded")]
    RateLimitExceeded { retry_after: u64, limit: u32 },
    #[error("content policy violation")]
    ContentPolicyViolation,
    #[error("unsupported species")]
    UnsupportedSpecies,
    #[error("species detection failed")]
    SpeciesDetectionFailed,
    #[error("breed detection failed")]
    BreedDetectionFailed,
    #[error("vision service unavailable")]
    VisionServiceUnavailable,
    #[error("{0}")]
    ServiceUnavailable(String),
    #[error("failed to delete user account: {0}")]
    DeletionFailed(String),
    #[error("pet not found")]
    PetNotFound,
    #[error("{0}")]
    HttpError(String),
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidImage(_) => "INVALID_IMAGE",
            Self::NotFound => "NOT_FOUND",
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::MissingToken => "MISSING_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenRevoked => "TOKEN_REVOKED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountDisabled => "ACCOUNT_DISABLED",
            Self::Forbidden => "FORBIDDEN",
            Self::RateLimitExceeded { .. } => "RATE_LIMIT_EXCEEDED",
            Self::ContentPolicyViolation => "CONTENT_POLICY_VIOLATION",
            Self::UnsupportedSpecies => "UNSUPPORTED_SPECIES",
            Self::SpeciesDetectionFailed => "SPECIES_DETECTION_FAILED",
            Self::BreedDetectionFailed => "BREED_DETECTION_FAILED",
            Self::VisionServiceUnavailable => "VISION_SERVICE_UNAVAILABLE",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::DeletionFailed(_) => "DELETION_FAILED",
            Self::PetNotFound => "PET_NOT_FOUND",
            Self::HttpError(_) => "HTTP_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidImage(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound | Self::PetNotFound => StatusCode::NOT_FOUND,
            Self::EmailAlreadyExists => StatusCode::CONFLICT,
            Self::Unauthorized
            | Self::MissingToken
            | Self::TokenExpired
            | Self::InvalidToken
            | Self::TokenRevoked
            | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::AccountDisabled | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::ContentPolicyViolation
            | Self::UnsupportedSpecies
            | Self::SpeciesDetectionFailed
            | Self::BreedDetectionFailed => StatusCode::UNPROCESSABLE_ENTITY,
            Self::VisionServiceUnavailable | Self::ServiceUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::DeletionFailed(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::HttpError(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// The message surfaced to the client. 5xx errors never echo their cause.
    fn client_message(&self) -> String {
        if self.status().is_server_error() {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(cause) = &self {
            tracing::error!(error = %cause, "internal error");
        }

        let status = self.status();
        let code = self.code();
        let details = match &self {
            Self::RateLimitExceeded { retry_after, limit } => {
                Some(json!({ "retry_after": retry_after, "limit": limit }))
            }
            _ => None,
        };
        let retry_after = match &self {
            Self::RateLimitExceeded { retry_after, .. } => Some(*retry_after),
            _ => None,
        };

        let message = self.client_message();
        let mut response = (status, Envelope::failure(code, message, details)).into_response();
        if let Some(seconds) = retry_after {
            if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
                response.headers_mut().insert("Retry-After", value);
            }
        }
        response
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
