//! The identity context every backend service trusts from the gateway's
//! injected headers, and every gateway-facing client derives from a verified
//! access token.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const HEADER_USER_ID: &str = "X-User-ID";
pub const HEADER_USER_ROLE: &str = "X-User-Role";
pub const HEADER_REQUEST_ID: &str = "X-Request-ID";
pub const HEADER_CORRELATION_ID: &str = "X-Correlation-ID";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: Uuid,
    pub role: String,
    pub email: Option<String>,
}

impl UserContext {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}
