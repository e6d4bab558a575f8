//! Recommendation service configuration.
//!
//! | Env | Default | Description |
//! |-----|---------|-------------|
//! | RECOMMENDATION_PORT | 8004 | TCP port to bind. |
//! | RECOMMENDATION_HOST | 0.0.0.0 | Bind address. |
//! | USER_DATA_SERVICE_URL | http://localhost:8005 | Base URL of the User Data service. |
//! | SIMILARITY_THRESHOLD | 0.3 | Minimum weighted-cosine score to keep a candidate. |
//! | DEFAULT_RECOMMENDATION_LIMIT | 10 | `limit` applied when the caller omits it. |
//! | MAX_RECOMMENDATION_LIMIT | 50 | Hard ceiling on `limit`. |
//! | REQUEST_TIMEOUT_SECONDS | 10 | Deadline for the outbound User Data call. |
//! | DATA_DIR | ./data/recommendation | Sled database directory. |

use std::time::Duration;

use petcare_common::config::{env_f64, env_string, env_u16, env_u32};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub user_data_url: String,
    pub similarity_threshold: f64,
    pub default_limit: u32,
    pub max_limit: u32,
    pub request_timeout: Duration,
    pub data_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env_string("RECOMMENDATION_HOST", "0.0.0.0"),
            port: env_u16("RECOMMENDATION_PORT", 8004),
            user_data_url: env_string("USER_DATA_SERVICE_URL", "http://localhost:8005"),
            similarity_threshold: env_f64("SIMILARITY_THRESHOLD", 0.3),
            default_limit: env_u32("DEFAULT_RECOMMENDATION_LIMIT", 10),
            max_limit: env_u32("MAX_RECOMMENDATION_LIMIT", 50),
            request_timeout: Duration::from_secs(env_u32("REQUEST_TIMEOUT_SECONDS", 10) as u64),
            data_dir: env_string("DATA_DIR", "./data/recommendation"),
        }
    }
}
