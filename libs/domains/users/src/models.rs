use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// A stored user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub email: String,
    /// ISO 3166-1 alpha-2, uppercase
    pub country: String,
    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a user from already normalized fields.
    ///
    /// Timestamps are placeholders until the store assigns its own.
    pub fn new(
        id: Uuid,
        first_name: String,
        last_name: String,
        nickname: String,
        email: String,
        country: String,
        password_hash: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            first_name,
            last_name,
            nickname,
            email,
            country,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating a user
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 1, message = "first name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "last name is required"))]
    pub last_name: String,

    #[validate(length(min = 1, message = "nickname is required"))]
    pub nickname: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,

    #[validate(email(message = "email is not a valid address"))]
    pub email: String,

    #[validate(custom(function = "validate_country_code"))]
    pub country: String,
}

/// Input for replacing the mutable fields of a user
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateUser {
    #[validate(custom(function = "validate_uuid"))]
    pub id: String,

    #[validate(length(min = 1, message = "first name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "last name is required"))]
    pub last_name: String,

    #[validate(length(min = 1, message = "nickname is required"))]
    pub nickname: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,

    #[validate(email(message = "email is not a valid address"))]
    pub email: String,

    #[validate(custom(function = "validate_country_code"))]
    pub country: String,
}

/// Conjunctive filter for listing users. Time bounds are exclusive.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
#[validate(schema(function = "validate_created_range"))]
pub struct UserFilter {
    #[validate(custom(function = "validate_country_code"))]
    pub country: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

/// A page of the user listing. `limit == 0` means no limit.
#[derive(Debug, Clone, Default, Validate)]
pub struct UserPage {
    #[validate(nested)]
    pub filter: Option<UserFilter>,
    pub offset: u64,
    pub limit: u64,
}

fn validate_uuid(id: &str) -> Result<(), ValidationError> {
    Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| ValidationError::new("uuid").with_message("id must be a UUID".into()))
}

/// ISO 3166-1 alpha-2 shape: exactly two ASCII letters, any case.
fn validate_country_code(country: &str) -> Result<(), ValidationError> {
    if country.len() == 2 && country.bytes().all(|b| b.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(ValidationError::new("country_code")
            .with_message("country must be a two-letter code".into()))
    }
}

fn validate_created_range(filter: &UserFilter) -> Result<(), ValidationError> {
    match (filter.created_from, filter.created_to) {
        (Some(from), Some(to)) if to < from => Err(ValidationError::new("created_range")
            .with_message("created_to must not be before created_from".into())),
        _ => Ok(()),
    }
}

/// Canonical stored form of a country code.
pub fn normalize_country(country: &str) -> String {
    country.to_ascii_uppercase()
}
