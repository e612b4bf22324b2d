use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::constants::keyword_limit;
use crate::error::AppResult;
use crate::models::{Identity, ParticipantEntry, RoomForm};
use crate::services::{RoomDetail, RoomView};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KeywordParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub pet_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct ParticipantsResponse {
    pub participants: Vec<ParticipantEntry>,
}

pub async fn list_rooms(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<RoomView>>> {
    let rooms = match params.q.as_deref() {
        Some(q) => state.matching.search_rooms(q).await?,
        None => state.matching.list_rooms().await?,
    };
    Ok(Json(rooms))
}

pub async fn top_keywords(
    State(state): State<AppState>,
    Query(params): Query<KeywordParams>,
) -> AppResult<Json<Vec<String>>> {
    let limit = keyword_limit(params.limit);
    Ok(Json(state.matching.top_keywords(limit).await?))
}

pub async fn get_room(
    State(state): State<AppState>,
    identity: Identity,
    Path(room_id): Path<i64>,
) -> AppResult<Json<RoomDetail>> {
    Ok(Json(state.matching.room_detail(room_id, &identity).await?))
}

pub async fn create_room(
    State(state): State<AppState>,
    identity: Identity,
    Json(form): Json<RoomForm>,
) -> AppResult<(StatusCode, Json<RoomView>)> {
    let room = state.matching.create_room(&identity, form).await?;
    let view = state.matching.get_room_view(room.id).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn update_room(
    State(state): State<AppState>,
    identity: Identity,
    Path(room_id): Path<i64>,
    Json(form): Json<RoomForm>,
) -> AppResult<Json<RoomView>> {
    state.matching.update_room(&identity, room_id, form).await?;
    Ok(Json(state.matching.get_room_view(room_id).await?))
}

pub async fn delete_room(
    State(state): State<AppState>,
    identity: Identity,
    Path(room_id): Path<i64>,
) -> AppResult<StatusCode> {
    state.matching.delete_room(&identity, room_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn apply_room(
    State(state): State<AppState>,
    identity: Identity,
    Path(room_id): Path<i64>,
    Json(req): Json<ApplyRequest>,
) -> AppResult<StatusCode> {
    state.matching.apply_room(room_id, &identity, &req.pet_ids).await?;
    Ok(StatusCode::CREATED)
}

pub async fn list_participants(
    State(state): State<AppState>,
    _identity: Identity,
    Path(room_id): Path<i64>,
) -> AppResult<Json<ParticipantsResponse>> {
    let participants = state.matching.get_participants(room_id).await?;
    Ok(Json(ParticipantsResponse { participants }))
}

pub async fn accept_participant(
    State(state): State<AppState>,
    identity: Identity,
    Path((room_id, user_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state
        .matching
        .accept_participant(&identity, room_id, user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reject_participant(
    State(state): State<AppState>,
    identity: Identity,
    Path((room_id, user_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state
        .matching
        .reject_participant(&identity, room_id, user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
