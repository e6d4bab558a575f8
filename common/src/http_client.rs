//! A thin `reqwest`-backed client for service-to-service calls, in the shape
//! of the bridge clients used to talk to external completion APIs: one
//! struct wrapping a pooled `reqwest::Client` with a fixed timeout, plus
//! small `get_json`/`post_json` helpers that map transport failures onto
//! `ApiError::ServiceUnavailable` rather than leaking `reqwest::Error`.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct ServiceClient {
    client: Client,
    base_url: String,
}

impl ServiceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client builds with a static timeout");
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        headers: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let mut req = self.client.get(self.url(path));
        for (key, value) in headers {
            req = req.header(*key, value);
        }
        let response = req
            .send()
            .await
            .map_err(|e| ApiError::ServiceUnavailable(e.to_string()))?;
        Self::decode(response).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        headers: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let mut req = self.client.post(self.url(path)).json(body);
        for (key, value) in headers {
            req = req.header(*key, value);
        }
        let response = req
            .send()
            .await
            .map_err(|e| ApiError::ServiceUnavailable(e.to_string()))?;
        Self::decode(response).await
    }

    pub async fn delete_json<T: DeserializeOwned>(
        &self,
        path: &str,
        headers: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let mut req = self.client.delete(self.url(path));
        for (key, value) in headers {
            req = req.header(*key, value);
        }
        let response = req
            .send()
            .await
            .map_err(|e| ApiError::ServiceUnavailable(e.to_string()))?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::ServiceUnavailable(e.to_string()))?;

        let envelope: BackendEnvelope<T> = serde_json::from_slice(&bytes).map_err(|e| {
            if status.is_success() {
                ApiError::internal(e)
            } else {
                ApiError::ServiceUnavailable(String::from_utf8_lossy(&bytes).to_string())
            }
        })?;

        if envelope.success {
            envelope.data.ok_or_else(|| ApiError::internal(anyhow::anyhow!("backend returned success with no data")))
        } else {
            let err = envelope.error.unwrap_or_default();
            Err(match err.code.as_str() {
                "NOT_FOUND" => ApiError::NotFound,
                "PET_NOT_FOUND" => ApiError::PetNotFound,
                "UNAUTHORIZED" => ApiError::Unauthorized,
                other => ApiError::ServiceUnavailable(format!("{other}: {}", err.message)),
            })
        }
    }
}

#[derive(Debug, serde::Deserialize)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
struct BackendEnvelope<T> {
    success: bool,
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    error: Option<BackendErrorBody>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct BackendErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}
