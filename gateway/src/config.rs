//! Gateway configuration.
//!
//! | Env | Default | Description |
//! |-----|---------|-------------|
//! | GATEWAY_PORT | 8001 | TCP port to bind. |
//! | GATEWAY_HOST | 0.0.0.0 | Bind address. |
//! | JWT_PUBLIC_KEY_PATH | ./keys/public.pem | RS256 public key used to verify access tokens. |
//! | IDENTITY_SERVICE_URL | http://localhost:8002 | Routing target for `/api/v1/auth`. |
//! | USER_DATA_SERVICE_URL | http://localhost:8005 | Routing target for `/api/v1/users`, `/pets`, `/analyses`. |
//! | VISION_SERVICE_URL | http://localhost:8003 | Routing target for `/api/v1/vision`, `/rag`. |
//! | RECOMMENDATION_SERVICE_URL | http://localhost:8004 | Routing target for `/api/v1/recommendations`, `/admin/products`, `/admin/rag`. |
//! | RATE_LIMIT_PER_MINUTE | 60 | Requests allowed per principal per 60s window. |
//! | CORS_ALLOWED_ORIGINS | (none) | Comma-separated allow-list. |
//! | COOKIE_DOMAIN | (unset) | Empty or `localhost` ⇒ omit the cookie `domain` attribute entirely. |
//! | REQUEST_TIMEOUT_SECONDS | 10 | Deadline applied to every outbound backend call. |

use std::time::Duration;

use petcare_common::config::{env_csv, env_opt_string, env_string, env_u16, env_u32};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub jwt_public_key_path: String,
    pub identity_url: String,
    pub user_data_url: String,
    pub vision_url: String,
    pub recommendation_url: String,
    pub rate_limit_per_minute: u32,
    pub cors_allowed_origins: Vec<String>,
    pub cookie_domain: Option<String>,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let cookie_domain = env_opt_string("COOKIE_DOMAIN").filter(|d| d != "localhost");
        Self {
            host: env_string("GATEWAY_HOST", "0.0.0.0"),
            port: env_u16("GATEWAY_PORT", 8001),
            jwt_public_key_path: env_string("JWT_PUBLIC_KEY_PATH", "./keys/public.pem"),
            identity_url: env_string("IDENTITY_SERVICE_URL", "http://localhost:8002"),
            user_data_url: env_string("USER_DATA_SERVICE_URL", "http://localhost:8005"),
            vision_url: env_string("VISION_SERVICE_URL", "http://localhost:8003"),
            recommendation_url: env_string("RECOMMENDATION_SERVICE_URL", "http://localhost:8004"),
            rate_limit_per_minute: env_u32("RATE_LIMIT_PER_MINUTE", 60),
            cors_allowed_origins: env_csv("CORS_ALLOWED_ORIGINS", &[]),
            cookie_domain,
            request_timeout: Duration::from_secs(env_u32("REQUEST_TIMEOUT_SECONDS", 10) as u64),
        }
    }
}
