use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use super::AppState;
use crate::error::AppResult;
use crate::models::{Identity, Schedule};

pub async fn confirm_schedule(
    State(state): State<AppState>,
    identity: Identity,
    Path(room_id): Path<i64>,
) -> AppResult<(StatusCode, Json<Vec<Schedule>>)> {
    let saved = state.calendar.confirm_schedule(&identity, room_id).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn list_schedules(
    State(state): State<AppState>,
    identity: Identity,
) -> AppResult<Json<Vec<Schedule>>> {
    Ok(Json(state.calendar.schedules_for(&identity).await?))
}
