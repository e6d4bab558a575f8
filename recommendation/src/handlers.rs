use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use petcare_common::context::HEADER_USER_ID;
use petcare_common::envelope::{respond, respond_empty, Envelope};
use petcare_common::error::{ApiError, ApiResult};

use crate::features::{extract_pet_features, extract_product_features};
use crate::models::{
    CreateProductRequest, NutritionalHighlights, PetProfile, Product, RecommendationItem, Species,
    UpdateProductRequest,
};
use crate::reasons::match_reasons;
use crate::similarity::rank;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FoodRecommendationsQuery {
    pub pet_id: Uuid,
    pub limit: Option<u32>,
    #[serde(default)]
    pub min_score: f64,
}

pub async fn food_recommendations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<FoodRecommendationsQuery>,
) -> ApiResult<Response> {
    let user_id = headers
        .get(HEADER_USER_ID)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let pet: PetProfile = state
        .user_data
        .get_json(
            &format!("/api/v1/pets/{}", query.pet_id),
            &[(HEADER_USER_ID, user_id.to_string())],
        )
        .await
        .map_err(|e| match e {
            ApiError::NotFound => ApiError::PetNotFound,
            other => other,
        })?;

    let limit = query
        .limit
        .unwrap_or(state.config.default_limit)
        .clamp(1, state.config.max_limit);

    let mut products = state
        .store
        .list_products(Some(pet.species), false)
        .map_err(ApiError::internal)?;
    products.sort_by(|a, b| a.id.cmp(&b.id));

    if products.is_empty() {
        return Ok(respond(
            StatusCode::OK,
            json!({
                "pet": pet_summary(&pet),
                "recommendations": Vec::<RecommendationItem>::new(),
                "metadata": {
                    "message": "No products available for this species",
                    "total_products_evaluated": 0,
                    "products_above_threshold": 0,
                }
            }),
        ));
    }

    let pet_features = extract_pet_features(&pet);
    let product_features: Vec<_> = products.iter().map(extract_product_features).collect();
    let ranked = rank(&pet_features, &product_features, state.config.similarity_threshold);

    let min_score = query.min_score.max(0.0).min(1.0);
    let mut recommendations = Vec::new();
    let mut rank_position = 0u32;
    for (idx, score) in ranked {
        if score < min_score {
            break;
        }
        rank_position += 1;
        if rank_position > limit {
            break;
        }
        let product = &products[idx];
        recommendations.push(RecommendationItem {
            product_id: product.id,
            name: product.name.clone(),
            brand: product.brand.clone(),
            price: product.price,
            product_url: product.product_url.clone(),
            image_url: product.image_url.clone(),
            similarity_score: round2(score),
            rank_position,
            match_reasons: match_reasons(product, &pet.name, &pet.health_conditions),
            nutritional_highlights: NutritionalHighlights {
                protein_percentage: product.protein_percentage,
                fat_percentage: product.fat_percentage,
                calories_per_100g: product.calories_per_100g,
            },
        });
    }

    let total_evaluated = products.len();
    let above_threshold = recommendations.len();
    Ok(respond(
        StatusCode::OK,
        json!({
            "pet": pet_summary(&pet),
            "recommendations": recommendations,
            "metadata": {
                "total_products_evaluated": total_evaluated,
                "products_above_threshold": above_threshold,
                "recommendations_returned": above_threshold,
            }
        }),
    ))
}

fn pet_summary(pet: &PetProfile) -> serde_json::Value {
    json!({
        "id": pet.id,
        "name": pet.name,
        "species": pet.species,
        "breed": pet.breed,
        "age_months": pet.age_months,
        "weight_kg": pet.weight_kg,
        "health_conditions": pet.health_conditions,
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> ApiResult<Response> {
    let now = Utc::now();
    let product = Product {
        id: Uuid::new_v4(),
        name: req.name,
        brand: req.brand,
        description: req.description,
        price: req.price,
        product_url: req.product_url,
        image_url: req.image_url,
        target_species: req.target_species,
        min_age_months: req.min_age_months,
        max_age_months: req.max_age_months,
        min_weight_kg: req.min_weight_kg,
        max_weight_kg: req.max_weight_kg,
        suitable_breeds: req.suitable_breeds,
        protein_percentage: req.protein_percentage,
        fat_percentage: req.fat_percentage,
        fiber_percentage: req.fiber_percentage,
        calories_per_100g: req.calories_per_100g,
        grain_free: req.grain_free,
        organic: req.organic,
        hypoallergenic: req.hypoallergenic,
        limited_ingredient: req.limited_ingredient,
        raw_food: req.raw_food,
        for_sensitive_stomach: req.for_sensitive_stomach,
        for_weight_management: req.for_weight_management,
        for_joint_health: req.for_joint_health,
        for_skin_allergies: req.for_skin_allergies,
        for_dental_health: req.for_dental_health,
        for_kidney_health: req.for_kidney_health,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    product.validate().map_err(ApiError::Validation)?;

    state.store.create_product(&product).map_err(ApiError::internal)?;
    Ok((StatusCode::CREATED, Envelope::success(json!({ "product": product }))).into_response())
}

#[derive(Debug, Deserialize, Default)]
pub struct ListProductsQuery {
    pub species: Option<Species>,
    #[serde(default)]
    pub include_inactive: bool,
    pub limit: Option<usize>,
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> ApiResult<Response> {
    let mut products = state
        .store
        .list_products(query.species, query.include_inactive)
        .map_err(ApiError::internal)?;
    if let Some(limit) = query.limit {
        products.truncate(limit);
    }
    let total = products.len();
    Ok(respond(StatusCode::OK, json!({ "products": products, "total": total })))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> ApiResult<Response> {
    let product = state
        .store
        .get_product(product_id)
        .map_err(ApiError::internal)?
        .ok_or(ApiError::NotFound)?;
    Ok(respond(StatusCode::OK, json!({ "product": product })))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(update): Json<UpdateProductRequest>,
) -> ApiResult<Response> {
    let mut product = state
        .store
        .get_product(product_id)
        .map_err(ApiError::internal)?
        .ok_or(ApiError::NotFound)?;

    if let Some(v) = update.name {
        product.name = v;
    }
    if let Some(v) = update.brand {
        product.brand = v;
    }
    if update.description.is_some() {
        product.description = update.description;
    }
    if update.price.is_some() {
        product.price = update.price;
    }
    if update.product_url.is_some() {
        product.product_url = update.product_url;
    }
    if update.image_url.is_some() {
        product.image_url = update.image_url;
    }
    if update.min_age_months.is_some() {
        product.min_age_months = update.min_age_months;
    }
    if update.max_age_months.is_some() {
        product.max_age_months = update.max_age_months;
    }
    if update.min_weight_kg.is_some() {
        product.min_weight_kg = update.min_weight_kg;
    }
    if update.max_weight_kg.is_some() {
        product.max_weight_kg = update.max_weight_kg;
    }
    if let Some(v) = update.suitable_breeds {
        product.suitable_breeds = v;
    }
    if update.protein_percentage.is_some() {
        product.protein_percentage = update.protein_percentage;
    }
    if update.fat_percentage.is_some() {
        product.fat_percentage = update.fat_percentage;
    }
    if update.fiber_percentage.is_some() {
        product.fiber_percentage = update.fiber_percentage;
    }
    if update.calories_per_100g.is_some() {
        product.calories_per_100g = update.calories_per_100g;
    }
    if let Some(v) = update.grain_free {
        product.grain_free = v;
    }
    if let Some(v) = update.organic {
        product.organic = v;
    }
    if let Some(v) = update.hypoallergenic {
        product.hypoallergenic = v;
    }
    if let Some(v) = update.limited_ingredient {
        product.limited_ingredient = v;
    }
    if let Some(v) = update.raw_food {
        product.raw_food = v;
    }
    if let Some(v) = update.for_sensitive_stomach {
        product.for_sensitive_stomach = v;
    }
    if let Some(v) = update.for_weight_management {
        product.for_weight_management = v;
    }
    if let Some(v) = update.for_joint_health {
        product.for_joint_health = v;
    }
    if let Some(v) = update.for_skin_allergies {
        product.for_skin_allergies = v;
    }
    if let Some(v) = update.for_dental_health {
        product.for_dental_health = v;
    }
    if let Some(v) = update.for_kidney_health {
        product.for_kidney_health = v;
    }
    if let Some(v) = update.is_active {
        product.is_active = v;
    }
    product.updated_at = Utc::now();
    product.validate().map_err(ApiError::Validation)?;

    state.store.save_product(&product).map_err(ApiError::internal)?;
    Ok(respond(StatusCode::OK, json!({ "product": product })))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> ApiResult<Response> {
    let mut product = state
        .store
        .get_product(product_id)
        .map_err(ApiError::internal)?
        .ok_or(ApiError::NotFound)?;
    product.is_active = false;
    product.updated_at = Utc::now();
    state.store.save_product(&product).map_err(ApiError::internal)?;
    Ok(respond_empty(StatusCode::NO_CONTENT))
}

pub async fn health() -> Response {
    respond(StatusCode::OK, json!({ "status": "ok", "service": "recommendation" }))
}
