use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{Audit, Gender};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Pet {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub pet_type: String,
    pub age: i32,
    #[sqlx(try_from = "String")]
    pub gender: Gender,
    pub weight: f64,
    pub personality: String,
    pub is_default: bool,
    pub profile_picture: Option<String>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,
}

#[derive(Debug, Clone)]
pub struct NewPet {
    pub owner_id: i64,
    pub name: String,
    pub pet_type: String,
    pub age: i32,
    pub gender: Gender,
    pub weight: f64,
    pub personality: String,
    pub is_default: bool,
    pub profile_picture: Option<String>,
}

/// Pet fields shown on a room page; ownership and audit data are left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetView {
    pub pet_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub pet_type: String,
    pub age: i32,
    pub gender: Gender,
    pub weight: f64,
    pub personality: String,
}

impl From<&Pet> for PetView {
    fn from(pet: &Pet) -> Self {
        Self {
            pet_id: pet.id,
            name: pet.name.clone(),
            pet_type: pet.pet_type.clone(),
            age: pet.age,
            gender: pet.gender,
            weight: pet.weight,
            personality: pet.personality.clone(),
        }
    }
}
