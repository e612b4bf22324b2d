use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use super::AppState;
use crate::error::AppResult;
use crate::models::{Identity, Pet};
use crate::services::accounts::{self, PetForm};

pub async fn list_pets(State(state): State<AppState>, identity: Identity) -> AppResult<Json<Vec<Pet>>> {
    Ok(Json(accounts::pets_of(&state.pool, &identity).await?))
}

pub async fn create_pet(
    State(state): State<AppState>,
    identity: Identity,
    Json(form): Json<PetForm>,
) -> AppResult<(StatusCode, Json<Pet>)> {
    let pet = accounts::register_pet(&state.pool, &identity, form).await?;
    Ok((StatusCode::CREATED, Json(pet)))
}

pub async fn get_pet(
    State(state): State<AppState>,
    _identity: Identity,
    Path(pet_id): Path<i64>,
) -> AppResult<Json<Pet>> {
    Ok(Json(accounts::find_pet(&state.pool, pet_id).await?))
}
