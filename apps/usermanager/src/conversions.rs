//! Proto ↔ domain mapping and the error-to-status table.

use chrono::{DateTime, Utc};
use domain_users::{CreateUser, UpdateUser, User, UserError, UserFilter, UserPage};
use rpc::users::{
    CreateUserRequest, GetUserPageRequest, UpdateUserRequest, UserFilter as ProtoUserFilter,
    UserSummary,
};
use tonic::Status;
use tracing::error;
use validator::ValidationErrors;

pub fn create_input(req: CreateUserRequest) -> CreateUser {
    CreateUser {
        first_name: req.first_name,
        last_name: req.last_name,
        nickname: req.nickname,
        password: req.password,
        email: req.email,
        country: req.country,
    }
}

pub fn update_input(req: UpdateUserRequest) -> UpdateUser {
    UpdateUser {
        id: req.id,
        first_name: req.first_name,
        last_name: req.last_name,
        nickname: req.nickname,
        password: req.password,
        email: req.email,
        country: req.country,
    }
}

pub fn user_page(req: GetUserPageRequest) -> Result<UserPage, Status> {
    Ok(UserPage {
        filter: req.filter.map(user_filter).transpose()?,
        offset: req.offset,
        limit: req.limit,
    })
}

fn user_filter(filter: ProtoUserFilter) -> Result<UserFilter, Status> {
    Ok(UserFilter {
        country: filter.country,
        created_from: filter
            .created_from
            .map(|ts| timestamp_to_datetime(ts, "created_from"))
            .transpose()?,
        created_to: filter
            .created_to
            .map(|ts| timestamp_to_datetime(ts, "created_to"))
            .transpose()?,
    })
}

/// Unix seconds to UTC
pub fn timestamp_to_datetime(secs: i64, field: &str) -> Result<DateTime<Utc>, Status> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| Status::invalid_argument(format!("{field} is out of range: {secs}")))
}

pub fn user_summary(user: User) -> UserSummary {
    UserSummary {
        id: user.id.to_string(),
        first_name: user.first_name,
        last_name: user.last_name,
        nickname: user.nickname,
        email: user.email,
        country: user.country,
        created_at: user.created_at.timestamp(),
    }
}

pub fn validation_status(errors: ValidationErrors) -> Status {
    status_from_error(errors.into())
}

pub fn status_from_error(err: UserError) -> Status {
    match err {
        UserError::Validation(msg) => Status::invalid_argument(msg),
        UserError::Conflict(_) => Status::already_exists(err.to_string()),
        UserError::NotFound(_) => Status::not_found(err.to_string()),
        UserError::Internal(_) | UserError::PasswordHash(_) => {
            error!(error = %err, "User request failed");
            Status::internal(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_users::UniqueField;
    use tonic::Code;
    use uuid::Uuid;
    use validator::Validate;

    #[test]
    fn test_error_codes() {
        let cases = [
            (UserError::Validation("bad".into()), Code::InvalidArgument),
            (UserError::Conflict(UniqueField::Email), Code::AlreadyExists),
            (UserError::NotFound(Uuid::nil()), Code::NotFound),
            (UserError::Internal("db down".into()), Code::Internal),
            (UserError::PasswordHash("rng".into()), Code::Internal),
        ];

        for (err, code) in cases {
            assert_eq!(status_from_error(err).code(), code);
        }
    }

    #[test]
    fn test_conflict_message_names_the_field() {
        let status = status_from_error(UserError::Conflict(UniqueField::Nickname));
        assert_eq!(status.message(), "nickname already exists");
    }

    #[test]
    fn test_validation_errors_become_invalid_argument() {
        let input = create_input(CreateUserRequest {
            first_name: "Ana".into(),
            last_name: "Ivanovic".into(),
            nickname: "ana".into(),
            password: "secret".into(),
            email: "not-an-email".into(),
            country: "RS".into(),
        });
        let status = validation_status(input.validate().unwrap_err());

        assert_eq!(status.code(), Code::InvalidArgument);
        assert!(status.message().contains("email"));
    }

    #[test]
    fn test_user_page_converts_seconds() {
        let page = user_page(GetUserPageRequest {
            filter: Some(ProtoUserFilter {
                country: Some("RS".into()),
                created_from: Some(1_700_000_000),
                created_to: None,
            }),
            offset: 3,
            limit: 7,
        })
        .unwrap();

        let filter = page.filter.unwrap();
        assert_eq!(filter.country.as_deref(), Some("RS"));
        assert_eq!(filter.created_from.unwrap().timestamp(), 1_700_000_000);
        assert!(filter.created_to.is_none());
        assert_eq!((page.offset, page.limit), (3, 7));
    }

    #[test]
    fn test_user_page_without_filter() {
        let page = user_page(GetUserPageRequest::default()).unwrap();
        assert!(page.filter.is_none());
        assert_eq!((page.offset, page.limit), (0, 0));
    }

    #[test]
    fn test_out_of_range_timestamp_is_rejected() {
        let err = user_page(GetUserPageRequest {
            filter: Some(ProtoUserFilter {
                created_to: Some(i64::MAX),
                ..Default::default()
            }),
            ..Default::default()
        })
        .unwrap_err();

        assert_eq!(err.code(), Code::InvalidArgument);
        assert!(err.message().contains("created_to"));
    }

    #[test]
    fn test_summary_omits_password() {
        let user = User::new(
            Uuid::new_v4(),
            "Ana".into(),
            "Ivanovic".into(),
            "ana".into(),
            "ana@example.com".into(),
            "RS".into(),
            "$argon2id$hash".into(),
        );
        let created = user.created_at.timestamp();
        let id = user.id.to_string();

        let summary = user_summary(user);
        assert_eq!(summary.id, id);
        assert_eq!(summary.created_at, created);
        assert_eq!(summary.country, "RS");
    }
}
