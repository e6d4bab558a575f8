//! HTTP clients for the three staged classifiers. Unlike the other petcare
//! services, these are modeled as external model-serving endpoints: they
//! return bare JSON, not the `{success, data, error}` envelope, so they are
//! called with a plain `reqwest::Client` rather than `ServiceClient`.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use petcare_common::error::ApiError;

use crate::models::{BreedClassifierResponse, ContentSafetyResponse, SpeciesDetectionResponse};

#[derive(Debug, Clone)]
pub struct ClassifierClients {
    client: Client,
    content_safety_url: String,
    species_classifier_url: String,
    breed_classifier_url: String,
}

impl ClassifierClients {
    pub fn new(
        content_safety_url: impl Into<String>,
        species_classifier_url: impl Into<String>,
        breed_classifier_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client builds with a static timeout");
        Self {
            client,
            content_safety_url: content_safety_url.into(),
            species_classifier_url: species_classifier_url.into(),
            breed_classifier_url: breed_classifier_url.into(),
        }
    }

    pub async fn check_content_safety(&self, image: &str) -> Result<ContentSafetyResponse, ApiError> {
        #[derive(Serialize)]
        struct Req<'a> {
            image: &'a str,
        }
        self.post(&self.content_safety_url, "/classify/content", &Req { image }).await
    }

    pub async fn detect_species(&self, image: &str) -> Result<SpeciesDetectionResponse, ApiError> {
        #[derive(Serialize)]
        struct Req<'a> {
            image: &'a str,
            top_k: u32,
        }
        self.post(&self.species_classifier_url, "/classify/species", &Req { image, top_k: 1 })
            .await
    }

    pub async fn classify_breed(&self, image: &str, species: &str) -> Result<BreedClassifierResponse, ApiError> {
        #[derive(Serialize)]
        struct Req<'a> {
            image: &'a str,
            species: &'a str,
            top_k: u32,
        }
        self.post(
            &self.breed_classifier_url,
            "/classify/breed",
            &Req { image, species, top_k: 5 },
        )
        .await
    }

    async fn post<B: Serialize + ?Sized, T: serde::de::DeserializeOwned>(
        &self,
        base_url: &str,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", base_url.trim_end_matches('/'), path);
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|_| ApiError::VisionServiceUnavailable)?;

        if !response.status().is_success() {
            return Err(ApiError::VisionServiceUnavailable);
        }

        response.json::<T>().await.map_err(|_| ApiError::VisionServiceUnavailable)
    }
}
