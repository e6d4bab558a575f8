use std::sync::Arc;

use jsonwebtoken::DecodingKey;
use reqwest::Client;

use crate::config::Config;
use crate::rate_limit::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub jwt_key: Arc<DecodingKey>,
    pub http: Client,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let jwt_key = petcare_common::jwt::load_public_key(&config.jwt_public_key_path)?;
        let http = Client::builder().timeout(config.request_timeout).build()?;
        let rate_limiter = RateLimiter::new(config.rate_limit_per_minute);
        Ok(Self {
            config: Arc::new(config),
            jwt_key: Arc::new(jwt_key),
            http,
            rate_limiter: Arc::new(rate_limiter),
        })
    }
}
