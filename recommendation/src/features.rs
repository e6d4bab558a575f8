//! 15-dimension feature extraction for pets and products, mirroring field
//! for field so that weighted cosine similarity between the two is
//! meaningful. Index layout:
//!
//! `[0]` age, `[1,3]` weight (min/max lanes), `[2]` breed specificity,
//! `[4..=10]` seven health-condition slots (six tags plus one reserved),
//! `[11..=13]` protein/fat/calorie, `[14]` ingredient preference.

use crate::models::{PetProfile, Product};

pub const FEATURE_LEN: usize = 15;

const HEALTH_CONDITIONS: [&str; 6] = [
    "sensitive_stomach",
    "weight_management",
    "joint_health",
    "skin_allergies",
    "dental_health",
    "kidney_health",
];

pub fn extract_pet_features(pet: &PetProfile) -> [f64; FEATURE_LEN] {
    let mut f = [0.0; FEATURE_LEN];

    let age_months = pet.age_months.unwrap_or(0) as f64;
    f[0] = (age_months / 200.0).min(1.0);

    let weight_kg = pet.weight_kg.unwrap_or(0.0);
    let normalized_weight = (weight_kg / 100.0).min(1.0);
    f[1] = normalized_weight;
    f[3] = normalized_weight;

    f[2] = if pet.breed.as_deref().is_some_and(|b| !b.is_empty()) {
        1.0
    } else {
        0.5
    };

    for (i, condition) in HEALTH_CONDITIONS.iter().enumerate() {
        if pet.health_conditions.contains(*condition) {
            f[4 + i] = 1.0;
        }
    }
    // f[10] reserved

    if age_months > 84.0 {
        f[11] = 0.8;
        f[12] = 0.6;
        f[13] = 0.7;
    } else if age_months < 12.0 {
        f[11] = 0.9;
        f[12] = 0.8;
        f[13] = 0.9;
    } else {
        f[11] = 0.7;
        f[12] = 0.5;
        f[13] = 0.6;
    }

    f[14] = 0.0;
    f
}

pub fn extract_product_features(product: &Product) -> [f64; FEATURE_LEN] {
    let mut f = [0.0; FEATURE_LEN];

    f[0] = match (product.min_age_months, product.max_age_months) {
        (Some(min), Some(max)) => (((min + max) as f64 / 2.0) / 200.0).min(1.0),
        (Some(min), None) => ((min as f64) / 200.0).min(1.0),
        (None, Some(max)) => ((max as f64) / 200.0).min(1.0),
        (None, None) => 0.5,
    };

    let weight = match (product.min_weight_kg, product.max_weight_kg) {
        (Some(min), Some(max)) => Some(((min + max) / 2.0 / 100.0).min(1.0)),
        (Some(min), None) => Some((min / 100.0).min(1.0)),
        (None, Some(max)) => Some((max / 100.0).min(1.0)),
        (None, None) => None,
    };
    match weight {
        Some(w) => {
            f[1] = w;
            f[3] = w;
        }
        None => {
            f[1] = 0.5;
            f[3] = 0.5;
        }
    }

    f[2] = if product.suitable_breeds.is_empty() { 0.5 } else { 1.0 };

    f[4] = bool_flag(product.for_sensitive_stomach);
    f[5] = bool_flag(product.for_weight_management);
    f[6] = bool_flag(product.for_joint_health);
    f[7] = bool_flag(product.for_skin_allergies);
    f[8] = bool_flag(product.for_dental_health);
    f[9] = bool_flag(product.for_kidney_health);
    // f[10] reserved

    if let Some(protein) = product.protein_percentage {
        f[11] = protein / 100.0;
    }
    if let Some(fat) = product.fat_percentage {
        f[12] = fat / 100.0;
    }
    if let Some(calories) = product.calories_per_100g {
        f[13] = ((calories - 250.0) / 250.0).min(1.0);
    }

    let mut ingredient_score: f64 = 0.0;
    if product.grain_free {
        ingredient_score += 0.3;
    }
    if product.organic {
        ingredient_score += 0.3;
    }
    if product.hypoallergenic {
        ingredient_score += 0.4;
    }
    f[14] = ingredient_score.min(1.0);

    f
}

fn bool_flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use uuid::Uuid;

    fn base_pet() -> PetProfile {
        PetProfile {
            id: Uuid::new_v4(),
            name: "Rex".into(),
            species: crate::models::Species::Dog,
            breed: None,
            age_months: None,
            weight_kg: None,
            health_conditions: BTreeSet::new(),
        }
    }

    #[test]
    fn pet_feature_vector_has_fifteen_dimensions() {
        let features = extract_pet_features(&base_pet());
        assert_eq!(features.len(), FEATURE_LEN);
    }

    #[test]
    fn pet_health_conditions_set_expected_slots() {
        let mut pet = base_pet();
        pet.health_conditions.insert("joint_health".into());
        let features = extract_pet_features(&pet);
        assert_eq!(features[6], 1.0);
        assert_eq!(features[4], 0.0);
    }

    #[test]
    fn puppy_gets_higher_protein_need_than_senior() {
        let mut puppy = base_pet();
        puppy.age_months = Some(6);
        let mut senior = base_pet();
        senior.age_months = Some(100);
        assert!(extract_pet_features(&puppy)[11] > extract_pet_features(&senior)[11]);
    }
}
