use std::sync::Arc;

use petcare_common::http_client::ServiceClient;

use crate::config::Config;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Store,
    pub user_data: ServiceClient,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::open(&config.data_dir)?;
        let user_data = ServiceClient::new(config.user_data_url.clone(), config.request_timeout);
        Ok(Self {
            config: Arc::new(config),
            store,
            user_data,
        })
    }
}
