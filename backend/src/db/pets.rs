use crate::models::{NewPet, Pet};
use anyhow::Result;
use sqlx::PgExecutor;

const PET_COLUMNS: &str = "id, owner_id, name, pet_type, age, gender, weight, personality, \
                           is_default, profile_picture, created_at, updated_at";

pub async fn create_pet<'e>(executor: impl PgExecutor<'e>, new_pet: &NewPet) -> Result<Pet> {
    let pet = sqlx::query_as::<_, Pet>(&format!(
        r#"
        INSERT INTO pets (owner_id, name, pet_type, age, gender, weight, personality, is_default, profile_picture)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {PET_COLUMNS}
        "#
    ))
    .bind(new_pet.owner_id)
    .bind(&new_pet.name)
    .bind(&new_pet.pet_type)
    .bind(new_pet.age)
    .bind(new_pet.gender.as_str())
    .bind(new_pet.weight)
    .bind(&new_pet.personality)
    .bind(new_pet.is_default)
    .bind(&new_pet.profile_picture)
    .fetch_one(executor)
    .await?;

    Ok(pet)
}

pub async fn get_pet_by_id<'e>(executor: impl PgExecutor<'e>, pet_id: i64) -> Result<Option<Pet>> {
    let pet = sqlx::query_as::<_, Pet>(&format!("SELECT {PET_COLUMNS} FROM pets WHERE id = $1"))
        .bind(pet_id)
        .fetch_optional(executor)
        .await?;

    Ok(pet)
}

/// Pets matching any of `pet_ids`; unknown ids are simply absent from the result.
pub async fn get_pets_by_ids<'e>(executor: impl PgExecutor<'e>, pet_ids: &[i64]) -> Result<Vec<Pet>> {
    let pets = sqlx::query_as::<_, Pet>(&format!(
        "SELECT {PET_COLUMNS} FROM pets WHERE id = ANY($1) ORDER BY id"
    ))
    .bind(pet_ids)
    .fetch_all(executor)
    .await?;

    Ok(pets)
}

pub async fn get_pets_by_owner<'e>(executor: impl PgExecutor<'e>, owner_id: i64) -> Result<Vec<Pet>> {
    let pets = sqlx::query_as::<_, Pet>(&format!(
        "SELECT {PET_COLUMNS} FROM pets WHERE owner_id = $1 ORDER BY is_default DESC, id"
    ))
    .bind(owner_id)
    .fetch_all(executor)
    .await?;

    Ok(pets)
}

pub async fn get_default_pet<'e>(executor: impl PgExecutor<'e>, owner_id: i64) -> Result<Option<Pet>> {
    let pet = sqlx::query_as::<_, Pet>(&format!(
        "SELECT {PET_COLUMNS} FROM pets WHERE owner_id = $1 AND is_default = TRUE"
    ))
    .bind(owner_id)
    .fetch_optional(executor)
    .await?;

    Ok(pet)
}
