//! Deterministic match-reason synthesis. Hardcoded phrases for the two
//! health conditions the original catalog singles out, plus a generic
//! fallback so every recommendation carries at least one reason.

use std::collections::BTreeSet;

use crate::models::Product;

pub fn match_reasons(product: &Product, pet_name: &str, pet_conditions: &BTreeSet<String>) -> Vec<String> {
    let mut reasons = Vec::new();

    if product.for_joint_health && pet_conditions.contains("joint_health") {
        reasons.push("Targets joint health".to_string());
    }
    if product.for_sensitive_stomach && pet_conditions.contains("sensitive_stomach") {
        reasons.push("Good for sensitive stomach".to_string());
    }
    if reasons.is_empty() {
        reasons.push(format!("Nutritionally compatible with {pet_name}"));
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn product(for_joint_health: bool, for_sensitive_stomach: bool) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Test Kibble".into(),
            brand: "Acme".into(),
            description: None,
            price: None,
            product_url: None,
            image_url: None,
            target_species: crate::models::Species::Dog,
            min_age_months: None,
            max_age_months: None,
            min_weight_kg: None,
            max_weight_kg: None,
            suitable_breeds: BTreeSet::new(),
            protein_percentage: None,
            fat_percentage: None,
            fiber_percentage: None,
            calories_per_100g: None,
            grain_free: false,
            organic: false,
            hypoallergenic: false,
            limited_ingredient: false,
            raw_food: false,
            for_sensitive_stomach,
            for_weight_management: false,
            for_joint_health,
            for_skin_allergies: false,
            for_dental_health: false,
            for_kidney_health: false,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn falls_back_to_generic_reason() {
        let p = product(false, false);
        let reasons = match_reasons(&p, "Rex", &BTreeSet::new());
        assert_eq!(reasons, vec!["Nutritionally compatible with Rex"]);
    }

    #[test]
    fn surfaces_joint_health_reason() {
        let p = product(true, false);
        let mut conditions = BTreeSet::new();
        conditions.insert("joint_health".to_string());
        let reasons = match_reasons(&p, "Rex", &conditions);
        assert!(reasons.iter().any(|r| r.contains("joint health")));
    }
}
