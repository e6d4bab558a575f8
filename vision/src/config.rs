//! Vision Orchestrator configuration.
//!
//! | Env | Default | Description |
//! |-----|---------|-------------|
//! | VISION_PORT | 8003 | TCP port to bind. |
//! | VISION_HOST | 0.0.0.0 | Bind address. |
//! | CONTENT_SAFETY_SERVICE_URL | http://localhost:9001 | Stage 1 classifier. |
//! | SPECIES_CLASSIFIER_URL | http://localhost:9002 | Stage 2 classifier. |
//! | BREED_CLASSIFIER_URL | http://localhost:9003 | Stage 3 classifier. |
//! | VLM_SERVICE_URL | http://localhost:9004 | Stage 5 vision-language model. |
//! | NSFW_REJECTION_THRESHOLD | 0.70 | Stage 1 fail threshold. |
//! | SPECIES_MIN_CONFIDENCE | 0.60 | Stage 2 minimum top-label confidence. |
//! | BREED_MIN_CONFIDENCE | 0.40 | Stage 3 minimum reported confidence. |
//! | CROSSBREED_PROBABILITY_THRESHOLD | 0.35 | Second-breed probability that alone implies crossbreed. |
//! | PUREBRED_CONFIDENCE_THRESHOLD | 0.75 | Top-breed confidence below which the gap rule applies. |
//! | PUREBRED_GAP_THRESHOLD | 0.30 | Maximum top/second gap still counted as crossbreed. |
//! | CROSSBREED_MIN_SECOND_BREED | 0.15 | Minimum second-breed probability for the gap rule to fire. |
//! | MAX_IMAGE_SIZE_MB | 5 | Stage 0 payload ceiling. |
//! | RAG_TOP_K | 3 | Chunks retrieved per enrichment query. |
//! | CALL_TIMEOUT_SECONDS | 30 | Deadline for every outbound classifier/VLM call. |
//! | DATA_DIR | ./data/vision | Sled path for the retrieval index. |

use std::time::Duration;

use petcare_common::config::{env_f64, env_string, env_u16, env_u32};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub content_safety_url: String,
    pub species_classifier_url: String,
    pub breed_classifier_url: String,
    pub vlm_url: String,
    pub nsfw_rejection_threshold: f64,
    pub species_min_confidence: f64,
    pub breed_min_confidence: f64,
    pub crossbreed_probability_threshold: f64,
    pub purebred_confidence_threshold: f64,
    pub purebred_gap_threshold: f64,
    pub crossbreed_min_second_breed: f64,
    pub max_image_size_bytes: u64,
    pub rag_top_k: usize,
    pub call_timeout: Duration,
    pub data_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        let max_image_size_mb = env_u32("MAX_IMAGE_SIZE_MB", 5) as u64;
        Self {
            host: env_string("VISION_HOST", "0.0.0.0"),
            port: env_u16("VISION_PORT", 8003),
            content_safety_url: env_string("CONTENT_SAFETY_SERVICE_URL", "http://localhost:9001"),
            species_classifier_url: env_string("SPECIES_CLASSIFIER_URL", "http://localhost:9002"),
            breed_classifier_url: env_string("BREED_CLASSIFIER_URL", "http://localhost:9003"),
            vlm_url: env_string("VLM_SERVICE_URL", "http://localhost:9004"),
            nsfw_rejection_threshold: env_f64("NSFW_REJECTION_THRESHOLD", 0.70),
            species_min_confidence: env_f64("SPECIES_MIN_CONFIDENCE", 0.60),
            breed_min_confidence: env_f64("BREED_MIN_CONFIDENCE", 0.40),
            crossbreed_probability_threshold: env_f64("CROSSBREED_PROBABILITY_THRESHOLD", 0.35),
            purebred_confidence_threshold: env_f64("PUREBRED_CONFIDENCE_THRESHOLD", 0.75),
            purebred_gap_threshold: env_f64("PUREBRED_GAP_THRESHOLD", 0.30),
            crossbreed_min_second_breed: env_f64("CROSSBREED_MIN_SECOND_BREED", 0.15),
            max_image_size_bytes: max_image_size_mb * 1024 * 1024,
            rag_top_k: env_u32("RAG_TOP_K", 3) as usize,
            call_timeout: Duration::from_secs(env_u32("CALL_TIMEOUT_SECONDS", 30) as u64),
            data_dir: env_string("DATA_DIR", "./data/vision"),
        }
    }
}
