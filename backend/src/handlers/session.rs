use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::constants::SESSION_USER_ID_KEY;
use crate::error::AppError;
use crate::models::Identity;

/// Resolves the logged-in user from the session cookie. Handlers taking an
/// `Identity` answer 401 to anonymous callers.
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Internal(anyhow::anyhow!(msg)))?;

        session
            .get::<i64>(SESSION_USER_ID_KEY)
            .await?
            .map(Identity::new)
            .ok_or_else(|| AppError::Unauthorized("Please log in first".to_string()))
    }
}

pub async fn sign_in(session: &Session, user_id: i64) -> Result<(), AppError> {
    session.cycle_id().await?;
    session.insert(SESSION_USER_ID_KEY, user_id).await?;
    Ok(())
}

pub async fn sign_out(session: &Session) -> Result<(), AppError> {
    session.flush().await?;
    Ok(())
}
