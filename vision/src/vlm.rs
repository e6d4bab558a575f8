//! Stage 5: contextual description generation against a vision-language
//! model endpoint. Builds a prompt from everything the earlier stages
//! learned, then parses the model's reply as JSON — directly, or failing
//! that from inside a fenced ```json block — since local VLM servers are
//! inconsistent about wrapping their output in prose.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use petcare_common::error::ApiError;

use crate::models::VlmAnalysis;

#[derive(Debug, Clone)]
pub struct VlmClient {
    client: Client,
    base_url: String,
}

impl VlmClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client builds with a static timeout");
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub async fn generate(
        &self,
        image_raw: &str,
        species: &str,
        breed_label: &str,
        confidence: f64,
        rag_context: Option<&str>,
    ) -> Result<VlmAnalysis, ApiError> {
        let image_b64 = match image_raw.split_once(',') {
            Some((_, payload)) => payload,
            None => image_raw,
        };
        let prompt = build_contextual_prompt(species, breed_label, confidence, rag_context);

        #[derive(Serialize)]
        struct Req<'a> {
            image: &'a str,
            prompt: &'a str,
        }

        let url = format!("{}/generate", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .json(&Req {
                image: image_b64,
                prompt: &prompt,
            })
            .send()
            .await
            .map_err(|_| ApiError::VisionServiceUnavailable)?;

        if !response.status().is_success() {
            return Err(ApiError::VisionServiceUnavailable);
        }

        let content: RawContent = response.json().await.map_err(|_| ApiError::VisionServiceUnavailable)?;
        parse_response(&content.content)
    }
}

#[derive(Debug, serde::Deserialize)]
struct RawContent {
    content: String,
}

fn build_contextual_prompt(species: &str, breed_label: &str, confidence: f64, rag_context: Option<&str>) -> String {
    let context = rag_context.unwrap_or("(unavailable)");
    format!(
        "You are looking at a {species} identified as {breed_label} (confidence: {confidence:.2}).\n\
         Breed context:\n{context}\n\n\
         Respond with JSON containing: description (a short visual description of this pet), \
         traits (an object of notable physical/temperament traits), and health_observations \
         (a list of any visible health considerations)."
    )
}

fn parse_response(content: &str) -> Result<VlmAnalysis, ApiError> {
    if let Ok(parsed) = serde_json::from_str::<VlmAnalysis>(content.trim()) {
        return Ok(parsed);
    }

    if let Some(start) = content.find("```json") {
        let after = &content[start + "```json".len()..];
        if let Some(end) = after.find("```") {
            let fenced = after[..end].trim();
            if let Ok(parsed) = serde_json::from_str::<VlmAnalysis>(fenced) {
                return Ok(parsed);
            }
        }
    }

    Err(ApiError::VisionServiceUnavailable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_direct_json() {
        let body = r#"{"description": "a fluffy dog", "traits": {"size": "medium"}, "health_observations": []}"#;
        let parsed = parse_response(body).unwrap();
        assert_eq!(parsed.description, "a fluffy dog");
    }

    #[test]
    fn parses_fenced_json_block() {
        let body = "Here you go:\n```json\n{\"description\": \"a tabby cat\", \"traits\": {}, \"health_observations\": [\"clear eyes\"]}\n```\nHope that helps!";
        let parsed = parse_response(body).unwrap();
        assert_eq!(parsed.description, "a tabby cat");
        assert_eq!(parsed.health_observations, vec!["clear eyes".to_string()]);
    }

    #[test]
    fn unparseable_content_maps_to_vision_unavailable() {
        let err = parse_response("not json at all").unwrap_err();
        assert!(matches!(err, ApiError::VisionServiceUnavailable));
    }
}
