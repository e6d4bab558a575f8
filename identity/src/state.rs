use std::sync::Arc;
use std::time::Duration;

use petcare_common::http_client::ServiceClient;

use crate::config::Config;
use crate::jwt::JwtCodec;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub jwt: Arc<JwtCodec>,
    pub store: Store,
    pub user_data: ServiceClient,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let jwt = JwtCodec::from_pem_files(&config.jwt_private_key_path, &config.jwt_public_key_path)?;
        let store = Store::open(&config.data_dir)?;
        let user_data = ServiceClient::new(config.user_data_service_url.clone(), Duration::from_secs(10));
        Ok(Self {
            config: Arc::new(config),
            jwt: Arc::new(jwt),
            store,
            user_data,
        })
    }
}
