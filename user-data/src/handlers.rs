use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use petcare_common::context::HEADER_USER_ID;
use petcare_common::envelope::{respond, Envelope};
use petcare_common::error::{ApiError, ApiResult};

use crate::models::{
    CreateAnalysisRequest, CreatePetRequest, Pet, PetAnalysis, Profile, ProfileUpdate,
    UpdatePetRequest,
};
use crate::state::AppState;

fn caller_id(headers: &HeaderMap) -> ApiResult<Uuid> {
    let raw = headers
        .get(HEADER_USER_ID)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::MissingToken)?;
    Uuid::parse_str(raw).map_err(|_| ApiError::InvalidToken)
}

pub async fn get_profile(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let user_id = caller_id(&headers)?;
    let profile = state
        .store
        .get_profile(user_id)
        .map_err(ApiError::internal)?
        .unwrap_or_else(|| Profile::new(user_id));
    Ok(respond(StatusCode::OK, json!({ "profile": profile })))
}

pub async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<Response> {
    let user_id = caller_id(&headers)?;
    let mut profile = state
        .store
        .get_profile(user_id)
        .map_err(ApiError::internal)?
        .unwrap_or_else(|| Profile::new(user_id));

    if let Some(phone) = update.phone {
        profile.phone = Some(phone);
    }
    if let Some(address) = update.address {
        profile.address = Some(address);
    }
    if let Some(preferences) = update.preferences {
        profile.preferences = preferences;
    }
    profile.updated_at = Utc::now();

    state.store.save_profile(&profile).map_err(ApiError::internal)?;
    Ok(respond(StatusCode::OK, json!({ "profile": profile })))
}

pub async fn list_pets(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let user_id = caller_id(&headers)?;
    let pets = state
        .store
        .list_pets_for_user(user_id)
        .map_err(ApiError::internal)?;
    Ok(respond(StatusCode::OK, json!({ "pets": pets })))
}

pub async fn create_pet(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreatePetRequest>,
) -> ApiResult<Response> {
    let user_id = caller_id(&headers)?;
    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("pet name is required".into()));
    }

    let now = Utc::now();
    let pet = Pet {
        id: Uuid::new_v4(),
        user_id,
        name: req.name,
        species: req.species,
        breed: req.breed,
        breed_confidence: req.breed_confidence,
        age_months: req.age_months,
        weight_kg: req.weight_kg,
        health_conditions: req.health_conditions,
        image_url: req.image_url,
        created_at: now,
        updated_at: now,
    };
    state.store.create_pet(&pet).map_err(ApiError::internal)?;
    Ok((StatusCode::CREATED, Envelope::success(json!({ "pet": pet }))).into_response())
}

async fn load_owned_pet(state: &AppState, user_id: Uuid, pet_id: Uuid) -> ApiResult<Pet> {
    let pet = state
        .store
        .get_pet(pet_id)
        .map_err(ApiError::internal)?
        .ok_or(ApiError::PetNotFound)?;
    if pet.user_id != user_id {
        return Err(ApiError::PetNotFound);
    }
    Ok(pet)
}

pub async fn get_pet(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(pet_id): Path<Uuid>,
) -> ApiResult<Response> {
    let user_id = caller_id(&headers)?;
    let pet = load_owned_pet(&state, user_id, pet_id).await?;
    Ok(respond(StatusCode::OK, json!({ "pet": pet })))
}

pub async fn update_pet(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(pet_id): Path<Uuid>,
    Json(update): Json<UpdatePetRequest>,
) -> ApiResult<Response> {
    let user_id = caller_id(&headers)?;
    let mut pet = load_owned_pet(&state, user_id, pet_id).await?;

    if let Some(name) = update.name {
        pet.name = name;
    }
    if update.breed.is_some() {
        pet.breed = update.breed;
    }
    if update.breed_confidence.is_some() {
        pet.breed_confidence = update.breed_confidence;
    }
    if update.age_months.is_some() {
        pet.age_months = update.age_months;
    }
    if update.weight_kg.is_some() {
        pet.weight_kg = update.weight_kg;
    }
    if let Some(conditions) = update.health_conditions {
        pet.health_conditions = conditions;
    }
    if update.image_url.is_some() {
        pet.image_url = update.image_url;
    }
    pet.updated_at = Utc::now();

    state.store.save_pet(&pet).map_err(ApiError::internal)?;
    Ok(respond(StatusCode::OK, json!({ "pet": pet })))
}

pub async fn delete_pet(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(pet_id): Path<Uuid>,
) -> ApiResult<Response> {
    let user_id = caller_id(&headers)?;
    load_owned_pet(&state, user_id, pet_id).await?;
    state.store.delete_pet(pet_id).map_err(ApiError::internal)?;
    Ok(respond(StatusCode::OK, json!({ "message": "Pet deleted" })))
}

pub async fn create_analysis(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateAnalysisRequest>,
) -> ApiResult<Response> {
    let user_id = caller_id(&headers)?;
    if let Some(pet_id) = req.pet_id {
        load_owned_pet(&state, user_id, pet_id).await?;
    }

    let analysis = PetAnalysis {
        id: Uuid::new_v4(),
        user_id,
        pet_id: req.pet_id,
        image_reference: req.image_reference,
        detected_breed: req.detected_breed,
        confidence: req.confidence,
        traits: req.traits,
        raw_response: req.raw_response,
        created_at: Utc::now(),
    };
    state
        .store
        .create_analysis(&analysis)
        .map_err(ApiError::internal)?;
    Ok((StatusCode::CREATED, Envelope::success(json!({ "analysis": analysis }))).into_response())
}

#[derive(Debug, Deserialize)]
pub struct ListAnalysesQuery {
    pub pet_id: Option<Uuid>,
}

pub async fn list_analyses(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListAnalysesQuery>,
) -> ApiResult<Response> {
    let user_id = caller_id(&headers)?;
    if let Some(pet_id) = query.pet_id {
        load_owned_pet(&state, user_id, pet_id).await?;
    }
    let analyses = state
        .store
        .list_analyses(user_id, query.pet_id)
        .map_err(ApiError::internal)?;
    Ok(respond(StatusCode::OK, json!({ "analyses": analyses })))
}

/// Cascades a full account deletion. Called by the identity service after
/// it has authenticated the caller; idempotent on repeat delivery.
pub async fn delete_user(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let user_id = caller_id(&headers)?;
    let summary = state
        .store
        .delete_cascade(user_id)
        .map_err(ApiError::internal)?;
    Ok(respond(StatusCode::OK, json!({ "deletion_summary": summary })))
}

pub async fn health() -> Response {
    respond(StatusCode::OK, json!({ "status": "ok", "service": "user-data" }))
}
