use strum::IntoEnumIterator;
use thiserror::Error;
use uuid::Uuid;

/// User fields that must be unique across all users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum UniqueField {
    Nickname,
    Email,
}

impl UniqueField {
    /// Name of the database constraint guarding this field.
    pub const fn constraint(self) -> &'static str {
        match self {
            UniqueField::Nickname => "users_nickname_key",
            UniqueField::Email => "users_email_key",
        }
    }

    /// Resolve the field guarded by a violated constraint.
    pub fn from_constraint(name: &str) -> Option<Self> {
        Self::iter().find(|field| field.constraint() == name)
    }
}

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{0} already exists")]
    Conflict(UniqueField),

    #[error("User not found: {0}")]
    NotFound(Uuid),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<validator::ValidationErrors> for UserError {
    fn from(errors: validator::ValidationErrors) -> Self {
        UserError::Validation(errors.to_string())
    }
}
