use std::sync::Arc;

use crate::config::Config;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Store,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::open(&config.data_dir)?;
        Ok(Self {
            config: Arc::new(config),
            store,
        })
    }
}
