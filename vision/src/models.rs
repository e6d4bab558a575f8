use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Dog,
    Cat,
}

impl Species {
    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Dog => "dog",
            Species::Cat => "cat",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ContentSafetyResponse {
    pub is_safe: bool,
    #[serde(default)]
    pub nsfw_probability: f64,
}

#[derive(Debug, Deserialize)]
pub struct SpeciesDetectionResponse {
    pub species: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreedProbability {
    pub breed: String,
    pub probability: f64,
}

#[derive(Debug, Deserialize)]
pub struct BreedClassifierResponse {
    pub breed_probabilities: Vec<BreedProbability>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrossbreedAnalysis {
    pub detected_breeds: Vec<String>,
    pub common_name: Option<String>,
    pub confidence_reasoning: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BreedAnalysis {
    pub primary_breed: String,
    pub confidence: f64,
    pub is_likely_crossbreed: bool,
    pub breed_probabilities: Vec<BreedProbability>,
    pub crossbreed_analysis: Option<CrossbreedAnalysis>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct EnrichedInfo {
    pub breed: Option<String>,
    pub parent_breeds: Option<Vec<String>>,
    pub description: String,
    pub care_summary: String,
    pub health_info: String,
    pub sources: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct VlmAnalysis {
    pub description: String,
    #[serde(default)]
    pub traits: serde_json::Value,
    #[serde(default)]
    pub health_observations: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct VisionReport {
    pub species: String,
    pub breed_analysis: BreedAnalysis,
    pub description: String,
    pub traits: serde_json::Value,
    pub health_observations: Vec<String>,
    pub enriched_info: Option<EnrichedInfo>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub content: String,
    pub source_file: String,
    pub breed: Option<String>,
    pub doc_type: Option<String>,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub chunks: Vec<IngestChunk>,
}

#[derive(Debug, Deserialize)]
pub struct IngestChunk {
    pub content: String,
    pub source_file: String,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub doc_type: Option<String>,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
pub struct RagQueryRequest {
    pub query: String,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub breed_filter: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RagSource {
    pub content: String,
    pub source_file: String,
    pub relevance_score: f64,
}
