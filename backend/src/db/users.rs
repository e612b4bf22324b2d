use crate::models::{NewUser, User};
use anyhow::Result;
use sqlx::PgExecutor;

const USER_COLUMNS: &str = "id, email, password_hash, name, age, gender, address, phone_number, \
                            is_verified, created_at, updated_at";

pub async fn create_user<'e>(executor: impl PgExecutor<'e>, new_user: &NewUser) -> Result<User> {
    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (email, password_hash, name, age, gender, address, phone_number, is_verified)
        VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(&new_user.email)
    .bind(&new_user.password_hash)
    .bind(&new_user.name)
    .bind(new_user.age)
    .bind(new_user.gender.as_str())
    .bind(&new_user.address)
    .bind(&new_user.phone_number)
    .fetch_one(executor)
    .await?;

    Ok(user)
}

pub async fn get_user_by_id<'e>(executor: impl PgExecutor<'e>, user_id: i64) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(user)
}

pub async fn get_users_by_ids<'e>(executor: impl PgExecutor<'e>, user_ids: &[i64]) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"
    ))
    .bind(user_ids)
    .fetch_all(executor)
    .await?;

    Ok(users)
}

pub async fn get_user_by_email<'e>(executor: impl PgExecutor<'e>, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
    ))
    .bind(email)
    .fetch_optional(executor)
    .await?;

    Ok(user)
}

pub async fn get_user_by_phone_number<'e>(
    executor: impl PgExecutor<'e>,
    phone_number: &str,
) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE phone_number = $1"
    ))
    .bind(phone_number)
    .fetch_optional(executor)
    .await?;

    Ok(user)
}

pub async fn email_exists<'e>(executor: impl PgExecutor<'e>, email: &str) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))"
    )
    .bind(email)
    .fetch_one(executor)
    .await?;

    Ok(exists)
}

pub async fn phone_number_exists<'e>(executor: impl PgExecutor<'e>, phone_number: &str) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE phone_number = $1)"
    )
    .bind(phone_number)
    .fetch_one(executor)
    .await?;

    Ok(exists)
}
