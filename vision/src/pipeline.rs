//! The staged analysis pipeline: decode, content safety, species, breed
//! (with crossbreed post-processing), enrichment, and contextual generation.
//! Every stage but enrichment is strict — its failure aborts the whole
//! analysis with the matching `ApiError`. Enrichment is tolerant: any
//! failure there degrades to `enriched_info: None` rather than failing the
//! request.

use petcare_common::error::ApiError;

use crate::classifiers::ClassifierClients;
use crate::config::Config;
use crate::crossbreed::process_breed_result;
use crate::image;
use crate::models::{BreedAnalysis, VisionReport};
use crate::retrieval::{synthesize_crossbreed, synthesize_purebred, RetrievalStore};
use crate::vlm::VlmClient;

pub struct Pipeline {
    pub config: Config,
    pub classifiers: ClassifierClients,
    pub vlm: VlmClient,
    pub retrieval: RetrievalStore,
}

impl Pipeline {
    pub async fn analyze(&self, raw_image: &str) -> Result<VisionReport, ApiError> {
        let decoded = image::decode_and_validate(raw_image, self.config.max_image_size_bytes)?;

        let safety = self.classifiers.check_content_safety(&decoded.raw).await?;
        if !safety.is_safe || safety.nsfw_probability >= self.config.nsfw_rejection_threshold {
            return Err(ApiError::ContentPolicyViolation);
        }

        let species_result = self.classifiers.detect_species(&decoded.raw).await?;
        if species_result.confidence < self.config.species_min_confidence {
            return Err(ApiError::SpeciesDetectionFailed);
        }
        let species = match species_result.species.to_lowercase().as_str() {
            "dog" => "dog",
            "cat" => "cat",
            _ => return Err(ApiError::UnsupportedSpecies),
        };

        let breed_response = self.classifiers.classify_breed(&decoded.raw, species).await?;
        if breed_response.breed_probabilities.is_empty() {
            return Err(ApiError::BreedDetectionFailed);
        }
        let top_confidence = breed_response
            .breed_probabilities
            .iter()
            .map(|p| p.probability)
            .fold(0.0_f64, f64::max);
        if top_confidence < self.config.breed_min_confidence {
            return Err(ApiError::BreedDetectionFailed);
        }
        let breed_analysis = process_breed_result(&self.config, breed_response.breed_probabilities);

        let enriched_info = self.enrich(&breed_analysis).await;

        let breed_label = breed_label_for_prompt(&breed_analysis);
        let rag_context = enriched_info.as_ref().map(|info| {
            format!(
                "{}\nCare: {}\nHealth: {}",
                info.description, info.care_summary, info.health_info
            )
        });

        let vlm_result = self
            .vlm
            .generate(
                &decoded.raw,
                species,
                &breed_label,
                breed_analysis.confidence,
                rag_context.as_deref(),
            )
            .await?;

        Ok(VisionReport {
            species: species.to_string(),
            breed_analysis,
            description: vlm_result.description,
            traits: vlm_result.traits,
            health_observations: vlm_result.health_observations,
            enriched_info,
        })
    }

    /// Tolerant enrichment lookup: failures are logged and swallowed so a
    /// down or empty retrieval index never fails the overall analysis.
    async fn enrich(&self, breed_analysis: &BreedAnalysis) -> Option<crate::models::EnrichedInfo> {
        let result = if let Some(crossbreed) = &breed_analysis.crossbreed_analysis {
            self.enrich_crossbreed(&crossbreed.detected_breeds).await
        } else {
            self.enrich_purebred(&breed_analysis.primary_breed).await
        };

        match result {
            Ok(info) => Some(info),
            Err(err) => {
                tracing::warn!(error = %err, "breed enrichment failed, continuing without it");
                None
            }
        }
    }

    async fn enrich_purebred(&self, breed: &str) -> anyhow::Result<crate::models::EnrichedInfo> {
        let embedding = placeholder_embedding(breed);
        let chunks = self.retrieval.search(&embedding, 5, Some(breed))?;
        Ok(synthesize_purebred(breed, &chunks))
    }

    async fn enrich_crossbreed(&self, parent_breeds: &[String]) -> anyhow::Result<crate::models::EnrichedInfo> {
        let mut per_parent = Vec::with_capacity(parent_breeds.len());
        for parent in parent_breeds {
            let embedding = placeholder_embedding(parent);
            let chunks = self.retrieval.search(&embedding, 3, Some(parent))?;
            per_parent.push(chunks);
        }
        Ok(synthesize_crossbreed(parent_breeds, &per_parent))
    }
}

fn breed_label_for_prompt(analysis: &BreedAnalysis) -> String {
    if let Some(crossbreed) = &analysis.crossbreed_analysis {
        crossbreed
            .common_name
            .clone()
            .unwrap_or_else(|| crossbreed.detected_breeds.join(" / "))
    } else {
        analysis.primary_breed.clone()
    }
}

/// Deterministic stand-in for a text embedding model: the retrieval index is
/// queried by breed name, and ingestion is expected to store chunks with
/// embeddings derived the same way, so brute-force cosine search still
/// recovers the right breed's chunks without a real embedding service.
fn placeholder_embedding(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0_f32; 32];
    for (i, byte) in text.to_lowercase().bytes().enumerate() {
        vector[i % 32] += byte as f32;
    }
    vector
}
