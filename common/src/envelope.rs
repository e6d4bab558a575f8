//! The response envelope every service and the gateway speak.
//!
//! `{success, data, error, timestamp}` with exactly one of `data`/`error`
//! populated and `timestamp` always RFC 3339 UTC.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct Envelope {
    pub success: bool,
    pub data: Option<Value>,
    pub error: Option<ErrorBody>,
    pub timestamp: DateTime<Utc>,
}

impl Envelope {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: Some(serde_json::to_value(data).unwrap_or(Value::Null)),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn failure(code: impl Into<String>, message: impl Into<String>, details: Option<Value>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code: code.into(),
                message: message.into(),
                details,
            }),
            timestamp: Utc::now(),
        }
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Wrap `data` in a success envelope with the given status code.
pub fn respond<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Envelope::success(data)).into_response()
}

/// A success envelope with no `data`, e.g. for a 204-style soft-delete that
/// the envelope convention still wants wrapped at 200/204.
pub fn respond_empty(status: StatusCode) -> Response {
    (status, Envelope::empty()).into_response()
}
