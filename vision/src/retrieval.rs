//! Stage 4 support: a sled-backed store of breed-knowledge chunks with
//! embeddings, searched by brute-force cosine similarity (the corpus is
//! small enough that an index would be premature), plus the synthesis
//! functions that turn retrieved chunks into `EnrichedInfo`.

use std::collections::BTreeSet;

use crate::models::{Chunk, EnrichedInfo, IngestChunk};

#[derive(Clone)]
pub struct RetrievalStore {
    chunks: sled::Tree,
}

impl RetrievalStore {
    pub fn open(data_dir: &str) -> anyhow::Result<Self> {
        let db = sled::open(data_dir)?;
        Ok(Self {
            chunks: db.open_tree("rag_chunks")?,
        })
    }

    pub fn ingest(&self, chunks: Vec<IngestChunk>) -> anyhow::Result<usize> {
        let mut count = 0;
        for chunk in chunks {
            let chunk = Chunk {
                id: uuid::Uuid::new_v4().to_string(),
                content: chunk.content,
                source_file: chunk.source_file,
                breed: chunk.breed,
                doc_type: chunk.doc_type,
                embedding: chunk.embedding,
            };
            self.chunks.insert(chunk.id.as_bytes(), serde_json::to_vec(&chunk)?)?;
            count += 1;
        }
        self.chunks.flush()?;
        Ok(count)
    }

    pub fn count(&self) -> usize {
        self.chunks.len()
    }

    fn all(&self) -> anyhow::Result<Vec<Chunk>> {
        let mut out = Vec::new();
        for item in self.chunks.iter() {
            let (_, bytes) = item?;
            out.push(serde_json::from_slice(&bytes)?);
        }
        Ok(out)
    }

    /// Top-`k` chunks by cosine similarity to `embedding`, optionally
    /// restricted to a single breed.
    pub fn search(&self, embedding: &[f32], top_k: usize, breed_filter: Option<&str>) -> anyhow::Result<Vec<Chunk>> {
        let mut scored: Vec<(f32, Chunk)> = self
            .all()?
            .into_iter()
            .filter(|c| match breed_filter {
                Some(breed) => c.breed.as_deref().map(|b| b.eq_ignore_ascii_case(breed)).unwrap_or(false),
                None => true,
            })
            .map(|c| {
                let score = cosine_similarity(embedding, &c.embedding);
                (score, c)
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored.into_iter().map(|(_, c)| c).collect())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

const FALLBACK_DESCRIPTION: &str = "No information available";
const FALLBACK_CARE: &str = "Standard care recommended";
const FALLBACK_HEALTH: &str = "Consult veterinarian for health information";

/// Purebred enrichment: one query against the breed's chunks, five results
/// read positionally as description / care / health.
pub fn synthesize_purebred(breed: &str, chunks: &[Chunk]) -> EnrichedInfo {
    let documents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();

    let description = documents.first().map(|d| truncate(d, 500)).unwrap_or_else(|| FALLBACK_DESCRIPTION.to_string());
    let care_summary = documents.get(1).map(|d| truncate(d, 300)).unwrap_or_else(|| FALLBACK_CARE.to_string());
    let health_info = documents.get(2).map(|d| truncate(d, 300)).unwrap_or_else(|| FALLBACK_HEALTH.to_string());

    let sources: BTreeSet<String> = chunks.iter().map(|c| c.source_file.clone()).collect();

    EnrichedInfo {
        breed: Some(breed.to_string()),
        parent_breeds: None,
        description,
        care_summary,
        health_info,
        sources: sources.into_iter().collect(),
    }
}

/// Crossbreed enrichment: chunks from both parent breeds are concatenated
/// in query order, then read back out of fixed document ranges.
pub fn synthesize_crossbreed(parent_breeds: &[String], per_parent_chunks: &[Vec<Chunk>]) -> EnrichedInfo {
    let all_documents: Vec<&str> = per_parent_chunks.iter().flatten().map(|c| c.content.as_str()).collect();

    let description = if all_documents.is_empty() {
        FALLBACK_DESCRIPTION.to_string()
    } else {
        all_documents.iter().take(3).cloned().collect::<Vec<_>>().join(" ")
    };
    let care_summary = if all_documents.len() > 3 {
        all_documents[3..all_documents.len().min(5)].join(" ")
    } else {
        FALLBACK_CARE.to_string()
    };
    let health_info = if all_documents.len() > 5 {
        all_documents[5..all_documents.len().min(7)].join(" ")
    } else {
        FALLBACK_HEALTH.to_string()
    };

    let sources: BTreeSet<String> = per_parent_chunks.iter().flatten().map(|c| c.source_file.clone()).collect();

    EnrichedInfo {
        breed: None,
        parent_breeds: Some(parent_breeds.to_vec()),
        description,
        care_summary,
        health_info,
        sources: sources.into_iter().collect(),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(content: &str, source: &str) -> Chunk {
        Chunk {
            id: "id".into(),
            content: content.into(),
            source_file: source.into(),
            breed: Some("labrador".into()),
            doc_type: None,
            embedding: vec![],
        }
    }

    #[test]
    fn cosine_similarity_identical_vectors_is_one() {
        let a = [1.0, 2.0, 3.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn purebred_synthesis_falls_back_on_missing_chunks() {
        let info = synthesize_purebred("labrador", &[chunk("desc text", "a.md")]);
        assert_eq!(info.description, "desc text");
        assert_eq!(info.care_summary, FALLBACK_CARE);
        assert_eq!(info.health_info, FALLBACK_HEALTH);
        assert_eq!(info.sources, vec!["a.md".to_string()]);
    }

    #[test]
    fn crossbreed_synthesis_concatenates_across_parents() {
        let parent_a = vec![chunk("golden desc", "golden.md")];
        let parent_b = vec![chunk("poodle desc", "poodle.md")];
        let info = synthesize_crossbreed(
            &["golden_retriever".to_string(), "poodle".to_string()],
            &[parent_a, parent_b],
        );
        assert_eq!(info.description, "golden desc poodle desc");
        assert_eq!(info.care_summary, FALLBACK_CARE);
        assert_eq!(info.sources, vec!["golden.md".to_string(), "poodle.md".to_string()]);
    }
}
