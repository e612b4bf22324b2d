use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use sqlx::PgPool;

use crate::db::{pets, users};
use crate::error::{AppError, AppResult};
use crate::models::{Gender, Identity, NewPet, NewUser, Pet, User};
use crate::utils::password::{hash_password, verify_password};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{8,11}$").expect("phone pattern is valid"));

const EMAIL_TAKEN: &str = "This email is already registered";
const PHONE_TAKEN: &str = "This phone number is already registered";

/// Unique indexes on `users`, see `migrations/0001_init.sql`.
const EMAIL_UNIQUE_INDEX: &str = "users_email_lower_idx";
const PHONE_UNIQUE_CONSTRAINT: &str = "users_phone_number_key";

/// Postgres `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// A concurrent sign-up can pass the existence checks and still lose on the
/// unique index; report that the same way as the checked case.
fn registration_conflict(err: anyhow::Error) -> AppError {
    let constraint = err
        .downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .filter(|db| db.code().as_deref() == Some(UNIQUE_VIOLATION))
        .map(|db| db.constraint().unwrap_or_default().to_string());

    match constraint.as_deref() {
        Some(EMAIL_UNIQUE_INDEX) => AppError::InvalidState(EMAIL_TAKEN.to_string()),
        Some(PHONE_UNIQUE_CONSTRAINT) => AppError::InvalidState(PHONE_TAKEN.to_string()),
        Some(other) => AppError::InvalidState(format!("Account already exists ({})", other)),
        None => AppError::Internal(err),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PetForm {
    pub name: String,
    #[serde(rename = "type")]
    pub pet_type: String,
    pub age: i32,
    pub gender: Gender,
    pub weight: f64,
    #[serde(default)]
    pub personality: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

/// Sign-up payload: the account and its first pet.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub name: String,
    pub age: i32,
    pub gender: Gender,
    pub address: String,
    pub phone_number: String,
    pub pet: PetForm,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

fn require(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        Err(AppError::Validation(format!("The {} is required", field)))
    } else {
        Ok(())
    }
}

pub fn validate_pet(form: &PetForm) -> AppResult<()> {
    require("pet name", &form.name)?;
    require("pet type", &form.pet_type)?;
    if form.age < 0 {
        return Err(AppError::Validation("Pet age can not be negative".to_string()));
    }
    if !form.weight.is_finite() || form.weight < 0.0 {
        return Err(AppError::Validation("Pet weight can not be negative".to_string()));
    }
    Ok(())
}

pub fn validate_registration(form: &RegisterForm) -> AppResult<()> {
    require("email", &form.email)?;
    require("password", &form.password)?;
    require("name", &form.name)?;
    require("address", &form.address)?;

    if !EMAIL_RE.is_match(form.email.trim()) {
        return Err(AppError::Validation("The email address is not valid".to_string()));
    }
    if !PHONE_RE.is_match(&form.phone_number) {
        return Err(AppError::Validation(
            "The phone number must be 8 to 11 digits".to_string(),
        ));
    }
    if form.age < 0 {
        return Err(AppError::Validation("Age can not be negative".to_string()));
    }

    validate_pet(&form.pet)
}

fn new_pet(owner_id: i64, form: PetForm, is_default: bool) -> NewPet {
    NewPet {
        owner_id,
        name: form.name.trim().to_string(),
        pet_type: form.pet_type.trim().to_string(),
        age: form.age,
        gender: form.gender,
        weight: form.weight,
        personality: form.personality,
        is_default,
        profile_picture: form.profile_picture,
    }
}

/// Creates the account and its default pet in one transaction.
pub async fn register(pool: &PgPool, form: RegisterForm) -> AppResult<(User, Pet)> {
    validate_registration(&form)?;
    let email = form.email.trim().to_string();

    let mut tx = pool.begin().await?;

    if users::email_exists(&mut *tx, &email).await? {
        return Err(AppError::InvalidState(EMAIL_TAKEN.to_string()));
    }
    if users::phone_number_exists(&mut *tx, &form.phone_number).await? {
        return Err(AppError::InvalidState(PHONE_TAKEN.to_string()));
    }

    let new_user = NewUser {
        email,
        password_hash: hash_password(&form.password)?,
        name: form.name.trim().to_string(),
        age: form.age,
        gender: form.gender,
        address: form.address.trim().to_string(),
        phone_number: form.phone_number,
    };
    let user = users::create_user(&mut *tx, &new_user)
        .await
        .map_err(registration_conflict)?;
    let pet = pets::create_pet(&mut *tx, &new_pet(user.id, form.pet, true)).await?;

    tx.commit().await?;

    tracing::info!("Registered user {} with default pet {}", user.id, pet.id);
    Ok((user, pet))
}

/// Unknown email and wrong password fail the same way.
pub async fn login(pool: &PgPool, form: &LoginForm) -> AppResult<User> {
    let denied = || AppError::Unauthorized("Invalid email or password".to_string());

    let user = users::get_user_by_email(pool, form.email.trim())
        .await?
        .ok_or_else(denied)?;
    if !verify_password(&form.password, &user.password_hash)? {
        tracing::debug!("Password mismatch for user {}", user.id);
        return Err(denied());
    }

    Ok(user)
}

pub async fn register_pet(pool: &PgPool, owner: &Identity, form: PetForm) -> AppResult<Pet> {
    validate_pet(&form)?;
    find_user(pool, owner.user_id).await?;

    let pet = pets::create_pet(pool, &new_pet(owner.user_id, form, false)).await?;
    tracing::info!("User {} registered pet {}", owner.user_id, pet.id);
    Ok(pet)
}

/// The default pet first, then the rest in creation order.
pub async fn pets_of(pool: &PgPool, owner: &Identity) -> AppResult<Vec<Pet>> {
    Ok(pets::get_pets_by_owner(pool, owner.user_id).await?)
}

pub async fn find_pet(pool: &PgPool, pet_id: i64) -> AppResult<Pet> {
    pets::get_pet_by_id(pool, pet_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Pet not found (id: {})", pet_id)))
}

pub async fn default_pet(pool: &PgPool, owner: &Identity) -> AppResult<Option<Pet>> {
    Ok(pets::get_default_pet(pool, owner.user_id).await?)
}

pub async fn find_user(pool: &PgPool, user_id: i64) -> AppResult<User> {
    users::get_user_by_id(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User not found (id: {})", user_id)))
}

pub async fn find_user_by_phone_number(pool: &PgPool, phone_number: &str) -> AppResult<User> {
    users::get_user_by_phone_number(pool, phone_number)
        .await?
        .ok_or_else(|| AppError::NotFound("No user with this phone number".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pet() -> PetForm {
        PetForm {
            name: "Bori".to_string(),
            pet_type: "Dog".to_string(),
            age: 2,
            gender: Gender::Female,
            weight: 4.2,
            personality: "playful".to_string(),
            profile_picture: None,
        }
    }

    fn registration() -> RegisterForm {
        RegisterForm {
            email: "amy@example.com".to_string(),
            password: "walkies".to_string(),
            name: "Amy".to_string(),
            age: 29,
            gender: Gender::Female,
            address: "Busan".to_string(),
            phone_number: "01098765432".to_string(),
            pet: pet(),
        }
    }

    fn rejects(form: RegisterForm) -> bool {
        matches!(validate_registration(&form), Err(AppError::Validation(_)))
    }

    #[test]
    fn test_valid_registration() {
        assert!(validate_registration(&registration()).is_ok());
    }

    #[test]
    fn test_required_fields() {
        assert!(rejects(RegisterForm { email: " ".into(), ..registration() }));
        assert!(rejects(RegisterForm { password: "".into(), ..registration() }));
        assert!(rejects(RegisterForm { name: "".into(), ..registration() }));
        assert!(rejects(RegisterForm { address: "\t".into(), ..registration() }));
    }

    #[test]
    fn test_email_shape() {
        assert!(rejects(RegisterForm { email: "amy.example.com".into(), ..registration() }));
        assert!(rejects(RegisterForm { email: "amy@example".into(), ..registration() }));
        assert!(!rejects(RegisterForm { email: "a.b+c@mail.co.kr".into(), ..registration() }));
    }

    #[test]
    fn test_phone_number_digits() {
        assert!(!rejects(RegisterForm { phone_number: "12345678".into(), ..registration() }));
        assert!(rejects(RegisterForm { phone_number: "1234567".into(), ..registration() }));
        assert!(rejects(RegisterForm { phone_number: "123456789012".into(), ..registration() }));
        assert!(rejects(RegisterForm { phone_number: "010-1234-5678".into(), ..registration() }));
    }

    #[test]
    fn test_negative_numbers() {
        assert!(rejects(RegisterForm { age: -1, ..registration() }));
        assert!(rejects(RegisterForm { pet: PetForm { age: -1, ..pet() }, ..registration() }));
        assert!(rejects(RegisterForm { pet: PetForm { weight: -0.5, ..pet() }, ..registration() }));
        assert!(validate_pet(&PetForm { weight: 0.0, age: 0, ..pet() }).is_ok());
    }

    #[test]
    fn test_other_failures_stay_internal() {
        let err = registration_conflict(anyhow::anyhow!("connection reset"));
        assert!(matches!(err, AppError::Internal(_)));

        let err = registration_conflict(sqlx::Error::RowNotFound.into());
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn test_pet_form_json() {
        let form: PetForm = serde_json::from_str(
            r#"{"name": "Nabi", "type": "Cat", "age": 5, "gender": "male", "weight": 3.1}"#,
        )
        .unwrap();

        assert_eq!(form.pet_type, "Cat");
        assert_eq!(form.gender, Gender::Male);
        assert!(form.personality.is_empty());
        assert!(validate_pet(&form).is_ok());
    }
}
