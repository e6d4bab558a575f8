//! Identity service configuration loaded from the environment.
//!
//! | Env | Default | Description |
//! |-----|---------|-------------|
//! | IDENTITY_PORT | 8002 | TCP port to bind. |
//! | IDENTITY_HOST | 0.0.0.0 | Bind address. |
//! | JWT_PRIVATE_KEY_PATH | ./keys/private.pem | PEM-encoded RSA private key used to sign tokens. |
//! | JWT_PUBLIC_KEY_PATH | ./keys/public.pem | PEM-encoded RSA public key used to verify tokens. |
//! | ACCESS_TOKEN_TTL_SECONDS | 900 | Access token lifetime. |
//! | REFRESH_TOKEN_TTL_SECONDS | 604800 | Refresh token lifetime. |
//! | USER_DATA_SERVICE_URL | http://localhost:8005 | Base URL for the cascade-delete call. |
//! | COOKIE_DOMAIN | (unset) | Cookie `Domain` attribute; unset or `localhost` omits it. |
//! | COOKIE_SECURE | false | Whether cookies carry the `Secure` attribute. |
//! | DATA_DIR | ./data/identity | Sled database directory. |

use std::time::Duration;

use petcare_common::config::{env_bool, env_duration_secs, env_opt_string, env_string, env_u16};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub jwt_private_key_path: String,
    pub jwt_public_key_path: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub user_data_service_url: String,
    pub cookie_domain: Option<String>,
    pub cookie_secure: bool,
    pub data_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        let cookie_domain = env_opt_string("COOKIE_DOMAIN")
            .filter(|d| !d.eq_ignore_ascii_case("localhost"));
        Self {
            host: env_string("IDENTITY_HOST", "0.0.0.0"),
            port: env_u16("IDENTITY_PORT", 8002),
            jwt_private_key_path: env_string("JWT_PRIVATE_KEY_PATH", "./keys/private.pem"),
            jwt_public_key_path: env_string("JWT_PUBLIC_KEY_PATH", "./keys/public.pem"),
            access_token_ttl: env_duration_secs("ACCESS_TOKEN_TTL_SECONDS", 900),
            refresh_token_ttl: env_duration_secs("REFRESH_TOKEN_TTL_SECONDS", 604_800),
            user_data_service_url: env_string("USER_DATA_SERVICE_URL", "http://localhost:8005"),
            cookie_domain,
            cookie_secure: env_bool("COOKIE_SECURE", false),
            data_dir: env_string("DATA_DIR", "./data/identity"),
        }
    }
}
