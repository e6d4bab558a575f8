//! Weighted cosine similarity between pet and product feature vectors.
//!
//! The weight vector below is the concrete, load-bearing coefficient table,
//! not the rounded prose approximation of it: index 10 (nominally
//! "reserved") carries a health-scale weight and index 14 (ingredient
//! preference) carries zero. Health-condition slots dominate by
//! construction — seven of fifteen dimensions at weight 0.40.

use crate::features::FEATURE_LEN;

const WEIGHT_HEALTH_CONDITIONS: f64 = 0.40;
const WEIGHT_AGE_COMPATIBILITY: f64 = 0.20;
const WEIGHT_NUTRITIONAL_PROFILE: f64 = 0.20;
const WEIGHT_SIZE_COMPATIBILITY: f64 = 0.10;

pub const WEIGHT_VECTOR: [f64; FEATURE_LEN] = [
    WEIGHT_AGE_COMPATIBILITY,        // 0: age
    WEIGHT_SIZE_COMPATIBILITY / 2.0, // 1: weight (min lane)
    0.05,                            // 2: breed specificity
    WEIGHT_SIZE_COMPATIBILITY / 2.0, // 3: weight (max lane)
    WEIGHT_HEALTH_CONDITIONS,        // 4: sensitive_stomach
    WEIGHT_HEALTH_CONDITIONS,        // 5: weight_management
    WEIGHT_HEALTH_CONDITIONS,        // 6: joint_health
    WEIGHT_HEALTH_CONDITIONS,        // 7: skin_allergies
    WEIGHT_HEALTH_CONDITIONS,        // 8: dental_health
    WEIGHT_HEALTH_CONDITIONS,        // 9: kidney_health
    WEIGHT_HEALTH_CONDITIONS,        // 10: reserved, still health-scaled
    WEIGHT_NUTRITIONAL_PROFILE / 2.0, // 11: protein
    WEIGHT_NUTRITIONAL_PROFILE / 4.0, // 12: fat
    WEIGHT_NUTRITIONAL_PROFILE / 4.0, // 13: calories
    0.0,                              // 14: ingredient preference
];

/// Weighted cosine similarity, or `0.0` if the result falls below
/// `threshold`. Mirrors `sklearn.metrics.pairwise.cosine_similarity` applied
/// to the element-wise weighted vectors.
pub fn weighted_cosine(
    pet: &[f64; FEATURE_LEN],
    product: &[f64; FEATURE_LEN],
    threshold: f64,
) -> f64 {
    let mut dot = 0.0;
    let mut pet_norm = 0.0;
    let mut product_norm = 0.0;

    for i in 0..FEATURE_LEN {
        let w = WEIGHT_VECTOR[i];
        let wp = pet[i] * w;
        let wq = product[i] * w;
        dot += wp * wq;
        pet_norm += wp * wp;
        product_norm += wq * wq;
    }

    if pet_norm == 0.0 || product_norm == 0.0 {
        return 0.0;
    }

    let similarity = dot / (pet_norm.sqrt() * product_norm.sqrt());
    if similarity < threshold {
        0.0
    } else {
        similarity
    }
}

/// Ranks candidates by descending similarity, ties broken by the caller
/// (stable sort preserves input order for equal scores). Entries scoring
/// `0.0` (below threshold) are excluded.
pub fn rank(
    pet: &[f64; FEATURE_LEN],
    products: &[[f64; FEATURE_LEN]],
    threshold: f64,
) -> Vec<(usize, f64)> {
    let mut scored: Vec<(usize, f64)> = products
        .iter()
        .enumerate()
        .map(|(i, product)| (i, weighted_cosine(pet, product, threshold)))
        .filter(|(_, score)| *score > 0.0)
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_score_one() {
        let v = [0.5; FEATURE_LEN];
        assert!((weighted_cosine(&v, &v, 0.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn below_threshold_scores_zero() {
        let pet = [1.0; FEATURE_LEN];
        let mut product = [0.0; FEATURE_LEN];
        product[0] = 0.01;
        assert_eq!(weighted_cosine(&pet, &product, 0.3), 0.0);
    }

    #[test]
    fn rank_is_non_increasing() {
        let pet = [1.0; FEATURE_LEN];
        let mut a = [0.9; FEATURE_LEN];
        a[6] = 1.0;
        let b = [0.5; FEATURE_LEN];
        let ranked = rank(&pet, &[b, a], 0.0);
        assert_eq!(ranked[0].0, 1);
        assert!(ranked[0].1 >= ranked[1].1);
    }
}
