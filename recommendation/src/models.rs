use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Dog,
    Cat,
}

/// The subset of a pet record this service needs, fetched from User Data by
/// way of the identity it was recommended for. Field names mirror the wire
/// shape of `GET /api/v1/pets/{id}`, not this service's own storage.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PetProfile {
    pub id: Uuid,
    pub name: String,
    pub species: Species,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub age_months: Option<i64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub health_conditions: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub product_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,

    pub target_species: Species,
    #[serde(default)]
    pub min_age_months: Option<i64>,
    #[serde(default)]
    pub max_age_months: Option<i64>,
    #[serde(default)]
    pub min_weight_kg: Option<f64>,
    #[serde(default)]
    pub max_weight_kg: Option<f64>,
    #[serde(default)]
    pub suitable_breeds: BTreeSet<String>,

    #[serde(default)]
    pub protein_percentage: Option<f64>,
    #[serde(default)]
    pub fat_percentage: Option<f64>,
    #[serde(default)]
    pub fiber_percentage: Option<f64>,
    #[serde(default)]
    pub calories_per_100g: Option<f64>,

    #[serde(default)]
    pub grain_free: bool,
    #[serde(default)]
    pub organic: bool,
    #[serde(default)]
    pub hypoallergenic: bool,
    #[serde(default)]
    pub limited_ingredient: bool,
    #[serde(default)]
    pub raw_food: bool,

    #[serde(default)]
    pub for_sensitive_stomach: bool,
    #[serde(default)]
    pub for_weight_management: bool,
    #[serde(default)]
    pub for_joint_health: bool,
    #[serde(default)]
    pub for_skin_allergies: bool,
    #[serde(default)]
    pub for_dental_health: bool,
    #[serde(default)]
    pub for_kidney_health: bool,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Well-ordered ranges and percentage bounds. Checked once at
    /// create/update time, not re-checked on every read.
    pub fn validate(&self) -> Result<(), String> {
        if let (Some(min), Some(max)) = (self.min_age_months, self.max_age_months) {
            if min > max {
                return Err("min_age_months must be <= max_age_months".into());
            }
        }
        if let (Some(min), Some(max)) = (self.min_weight_kg, self.max_weight_kg) {
            if min > max {
                return Err("min_weight_kg must be <= max_weight_kg".into());
            }
        }
        for (name, pct) in [
            ("protein_percentage", self.protein_percentage),
            ("fat_percentage", self.fat_percentage),
            ("fiber_percentage", self.fiber_percentage),
        ] {
            if let Some(v) = pct {
                if !(0.0..=100.0).contains(&v) {
                    return Err(format!("{name} must be between 0 and 100"));
                }
            }
        }
        if let Some(cal) = self.calories_per_100g {
            if cal <= 0.0 {
                return Err("calories_per_100g must be positive".into());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub brand: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub product_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub target_species: Species,
    #[serde(default)]
    pub min_age_months: Option<i64>,
    #[serde(default)]
    pub max_age_months: Option<i64>,
    #[serde(default)]
    pub min_weight_kg: Option<f64>,
    #[serde(default)]
    pub max_weight_kg: Option<f64>,
    #[serde(default)]
    pub suitable_breeds: BTreeSet<String>,
    #[serde(default)]
    pub protein_percentage: Option<f64>,
    #[serde(default)]
    pub fat_percentage: Option<f64>,
    #[serde(default)]
    pub fiber_percentage: Option<f64>,
    #[serde(default)]
    pub calories_per_100g: Option<f64>,
    #[serde(default)]
    pub grain_free: bool,
    #[serde(default)]
    pub organic: bool,
    #[serde(default)]
    pub hypoallergenic: bool,
    #[serde(default)]
    pub limited_ingredient: bool,
    #[serde(default)]
    pub raw_food: bool,
    #[serde(default)]
    pub for_sensitive_stomach: bool,
    #[serde(default)]
    pub for_weight_management: bool,
    #[serde(default)]
    pub for_joint_health: bool,
    #[serde(default)]
    pub for_skin_allergies: bool,
    #[serde(default)]
    pub for_dental_health: bool,
    #[serde(default)]
    pub for_kidney_health: bool,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub product_url: Option<String>,
    pub image_url: Option<String>,
    pub min_age_months: Option<i64>,
    pub max_age_months: Option<i64>,
    pub min_weight_kg: Option<f64>,
    pub max_weight_kg: Option<f64>,
    pub suitable_breeds: Option<BTreeSet<String>>,
    pub protein_percentage: Option<f64>,
    pub fat_percentage: Option<f64>,
    pub fiber_percentage: Option<f64>,
    pub calories_per_100g: Option<f64>,
    pub grain_free: Option<bool>,
    pub organic: Option<bool>,
    pub hypoallergenic: Option<bool>,
    pub limited_ingredient: Option<bool>,
    pub raw_food: Option<bool>,
    pub for_sensitive_stomach: Option<bool>,
    pub for_weight_management: Option<bool>,
    pub for_joint_health: Option<bool>,
    pub for_skin_allergies: Option<bool>,
    pub for_dental_health: Option<bool>,
    pub for_kidney_health: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct NutritionalHighlights {
    pub protein_percentage: Option<f64>,
    pub fat_percentage: Option<f64>,
    pub calories_per_100g: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationItem {
    pub product_id: Uuid,
    pub name: String,
    pub brand: String,
    pub price: Option<f64>,
    pub product_url: Option<String>,
    pub image_url: Option<String>,
    pub similarity_score: f64,
    pub rank_position: u32,
    pub match_reasons: Vec<String>,
    pub nutritional_highlights: NutritionalHighlights,
}
