//! Turns ranked breed probabilities into a `BreedAnalysis`, detecting
//! crossbreeds and naming them from a fixed lookup table of known mixes.

use crate::config::Config;
use crate::models::{BreedAnalysis, BreedProbability, CrossbreedAnalysis};

const CROSSBREED_NAMES: &[((&str, &str), &str)] = &[
    (("golden retriever", "poodle"), "Goldendoodle"),
    (("labrador retriever", "poodle"), "Labradoodle"),
    (("pug", "beagle"), "Puggle"),
    (("cocker spaniel", "poodle"), "Cockapoo"),
    (("yorkshire terrier", "poodle"), "Yorkipoo"),
    (("maltese", "poodle"), "Maltipoo"),
    (("cavalier king charles spaniel", "poodle"), "Cavapoo"),
    (("pomeranian", "husky"), "Pomsky"),
    (("chihuahua", "dachshund"), "Chiweenie"),
    (("chihuahua", "yorkshire terrier"), "Chorkie"),
];

fn title_case(breed: &str) -> String {
    breed
        .replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn lookup_common_name(breeds: &[String]) -> Option<&'static str> {
    let mut normalized: Vec<String> = breeds.iter().map(|b| b.to_lowercase()).collect();
    normalized.sort();
    let key = (normalized[0].as_str(), normalized[1].as_str());
    let reversed = (normalized[1].as_str(), normalized[0].as_str());
    CROSSBREED_NAMES
        .iter()
        .find(|(k, _)| *k == key || *k == reversed)
        .map(|(_, name)| *name)
}

pub fn process_breed_result(config: &Config, mut probabilities: Vec<BreedProbability>) -> BreedAnalysis {
    probabilities.sort_by(|a, b| b.probability.partial_cmp(&a.probability).unwrap_or(std::cmp::Ordering::Equal));

    if probabilities.is_empty() {
        return BreedAnalysis {
            primary_breed: "unknown".to_string(),
            confidence: 0.0,
            is_likely_crossbreed: false,
            breed_probabilities: Vec::new(),
            crossbreed_analysis: None,
        };
    }

    let top = probabilities[0].clone();
    let second = probabilities.get(1).cloned();

    let mut is_crossbreed = false;
    if let Some(second) = &second {
        if second.probability > config.crossbreed_probability_threshold {
            is_crossbreed = true;
        }
        if top.probability < config.purebred_confidence_threshold {
            let gap = top.probability - second.probability;
            if gap < config.purebred_gap_threshold && second.probability > config.crossbreed_min_second_breed {
                is_crossbreed = true;
            }
        }
    }

    let mut primary_breed = top.breed.clone();
    let mut confidence = top.probability;
    let mut crossbreed_analysis = None;

    if is_crossbreed {
        if let Some(second) = &second {
            let detected_breeds = vec![title_case(&top.breed), title_case(&second.breed)];
            let common_name = lookup_common_name(&detected_breeds).map(|s| s.to_string());

            let mut reasoning_parts = Vec::new();
            if second.probability > config.crossbreed_probability_threshold {
                reasoning_parts.push(format!(
                    "Multiple breeds with high probabilities ({}: {:.2}, {}: {:.2})",
                    top.breed, top.probability, second.breed, second.probability
                ));
            }
            if top.probability < config.purebred_confidence_threshold {
                reasoning_parts.push(format!("Low top-breed confidence ({:.2})", top.probability));
            }
            let reasoning = if reasoning_parts.is_empty() {
                "Multiple breed characteristics detected".to_string()
            } else {
                reasoning_parts.join(". ")
            };

            primary_breed = match &common_name {
                Some(name) => name.to_lowercase().replace(' ', "_"),
                None => format!(
                    "{}_{}_mix",
                    detected_breeds[0].to_lowercase().replace(' ', "_"),
                    detected_breeds[1].to_lowercase().replace(' ', "_")
                ),
            };
            confidence = round2((top.probability + second.probability) / 2.0);

            crossbreed_analysis = Some(CrossbreedAnalysis {
                detected_breeds,
                common_name,
                confidence_reasoning: reasoning,
            });
        }
    } else {
        confidence = round2(confidence);
    }

    BreedAnalysis {
        primary_breed,
        confidence,
        is_likely_crossbreed: is_crossbreed,
        breed_probabilities: probabilities
            .into_iter()
            .map(|bp| BreedProbability {
                breed: bp.breed,
                probability: round2(bp.probability),
            })
            .collect(),
        crossbreed_analysis,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            host: "0.0.0.0".into(),
            port: 8003,
            content_safety_url: String::new(),
            species_classifier_url: String::new(),
            breed_classifier_url: String::new(),
            vlm_url: String::new(),
            nsfw_rejection_threshold: 0.70,
            species_min_confidence: 0.60,
            breed_min_confidence: 0.40,
            crossbreed_probability_threshold: 0.35,
            purebred_confidence_threshold: 0.75,
            purebred_gap_threshold: 0.30,
            crossbreed_min_second_breed: 0.15,
            max_image_size_bytes: 5 * 1024 * 1024,
            rag_top_k: 3,
            call_timeout: std::time::Duration::from_secs(30),
            data_dir: "./data/vision".into(),
        }
    }

    fn probs(pairs: &[(&str, f64)]) -> Vec<BreedProbability> {
        pairs
            .iter()
            .map(|(b, p)| BreedProbability {
                breed: b.to_string(),
                probability: *p,
            })
            .collect()
    }

    #[test]
    fn detects_crossbreed_via_high_second_probability() {
        let result = process_breed_result(
            &config(),
            probs(&[("golden_retriever", 0.47), ("poodle", 0.36), ("labrador_retriever", 0.17)]),
        );
        assert!(result.is_likely_crossbreed);
        assert_eq!(result.primary_breed, "goldendoodle");
        assert_eq!(result.confidence, 0.42);
        let analysis = result.crossbreed_analysis.unwrap();
        assert_eq!(analysis.common_name.as_deref(), Some("Goldendoodle"));
        assert_eq!(analysis.detected_breeds, vec!["Golden Retriever", "Poodle"]);
    }

    #[test]
    fn reports_purebred_when_top_dominates() {
        let result = process_breed_result(
            &config(),
            probs(&[("golden_retriever", 0.89), ("labrador_retriever", 0.06), ("poodle", 0.05)]),
        );
        assert!(!result.is_likely_crossbreed);
        assert_eq!(result.primary_breed, "golden_retriever");
        assert_eq!(result.confidence, 0.89);
        assert!(result.crossbreed_analysis.is_none());
    }

    #[test]
    fn synthesizes_mix_name_when_not_in_lookup_table() {
        let result = process_breed_result(&config(), probs(&[("beagle", 0.40), ("dachshund", 0.38)]));
        assert!(result.is_likely_crossbreed);
        assert_eq!(result.primary_breed, "beagle_dachshund_mix");
    }

    #[test]
    fn gap_rule_requires_non_trivial_second_probability() {
        let result = process_breed_result(&config(), probs(&[("beagle", 0.50), ("dachshund", 0.05)]));
        assert!(!result.is_likely_crossbreed);
    }

    #[test]
    fn empty_probabilities_reports_unknown() {
        let result = process_breed_result(&config(), Vec::new());
        assert_eq!(result.primary_breed, "unknown");
        assert_eq!(result.confidence, 0.0);
    }
}
