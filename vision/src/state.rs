use std::sync::Arc;

use crate::classifiers::ClassifierClients;
use crate::config::Config;
use crate::pipeline::Pipeline;
use crate::retrieval::RetrievalStore;
use crate::vlm::VlmClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<Pipeline>,
    pub retrieval: RetrievalStore,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let retrieval = RetrievalStore::open(&config.data_dir)?;
        let classifiers = ClassifierClients::new(
            config.content_safety_url.clone(),
            config.species_classifier_url.clone(),
            config.breed_classifier_url.clone(),
            config.call_timeout,
        );
        let vlm = VlmClient::new(config.vlm_url.clone(), config.call_timeout);
        let pipeline = Pipeline {
            config: config.clone(),
            classifiers,
            vlm,
            retrieval: retrieval.clone(),
        };
        Ok(Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            retrieval,
        })
    }
}
