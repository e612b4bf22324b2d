use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;
use tower_sessions::Session;

use super::session::{sign_in, sign_out};
use super::AppState;
use crate::error::AppResult;
use crate::models::{Identity, Pet, User};
use crate::services::accounts::{self, LoginForm, RegisterForm};

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: User,
    pub pet: Pet,
}

pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegisterForm>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let (user, pet) = accounts::register(&state.pool, form).await?;
    Ok((StatusCode::CREATED, Json(RegisterResponse { user, pet })))
}

pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> AppResult<Json<User>> {
    let user = accounts::login(&state.pool, &form).await?;
    sign_in(&session, user.id).await?;

    tracing::info!("User {} logged in", user.id);
    Ok(Json(user))
}

pub async fn logout(session: Session) -> AppResult<StatusCode> {
    sign_out(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: User,
    pub default_pet: Option<Pet>,
}

pub async fn me(State(state): State<AppState>, identity: Identity) -> AppResult<Json<MeResponse>> {
    let user = accounts::find_user(&state.pool, identity.user_id).await?;
    let default_pet = accounts::default_pet(&state.pool, &identity).await?;
    Ok(Json(MeResponse { user, default_pet }))
}
