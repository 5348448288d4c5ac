use async_trait::async_trait;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sqlx::error::ErrorKind;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    RuntimeErr,
};
use uuid::Uuid;

use crate::{
    entity,
    error::{UniqueField, UserError, UserResult},
    models::{User, UserFilter},
    repository::UserRepository,
};

pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Field whose unique constraint rejected the write, if that is what failed.
fn violated_unique_field(err: &DbErr) -> Option<UniqueField> {
    let db_err = match err {
        DbErr::Exec(RuntimeErr::SqlxError(e)) | DbErr::Query(RuntimeErr::SqlxError(e)) => {
            e.as_database_error()?
        }
        _ => return None,
    };

    if !matches!(db_err.kind(), ErrorKind::UniqueViolation) {
        return None;
    }
    db_err.constraint().and_then(UniqueField::from_constraint)
}

/// Translate a failed write into a domain error.
fn write_error(err: DbErr) -> UserError {
    match violated_unique_field(&err) {
        Some(field) => UserError::Conflict(field),
        None => internal(err),
    }
}

fn internal(err: DbErr) -> UserError {
    UserError::Internal(format!("Database error: {}", err))
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn add(&self, user: User) -> UserResult<()> {
        let id = user.id;

        entity::Entity::insert(entity::ActiveModel::from_user(user))
            .exec_without_returning(&self.db)
            .await
            .map_err(write_error)?;

        tracing::info!(user_id = %id, "Created user");
        Ok(())
    }

    async fn update(&self, user: User) -> UserResult<()> {
        let id = user.id;
        let mut changes = entity::ActiveModel::from_user(user);
        changes.id = NotSet;

        let result = entity::Entity::update_many()
            .set(changes)
            .filter(entity::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(write_error)?;

        if result.rows_affected == 0 {
            return Err(UserError::NotFound(id));
        }

        tracing::info!(user_id = %id, "Updated user");
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> UserResult<()> {
        let result = entity::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(internal)?;

        if result.rows_affected == 0 {
            return Err(UserError::NotFound(id));
        }

        tracing::info!(user_id = %id, "Deleted user");
        Ok(())
    }

    async fn query(
        &self,
        filter: Option<UserFilter>,
        offset: u64,
        limit: u64,
    ) -> UserResult<Vec<User>> {
        let mut query = entity::Entity::find();

        if let Some(filter) = filter {
            if let Some(country) = filter.country {
                query = query.filter(entity::Column::Country.eq(country));
            }
            if let Some(from) = filter.created_from {
                query = query.filter(entity::Column::CreatedAt.gt(from));
            }
            if let Some(to) = filter.created_to {
                query = query.filter(entity::Column::CreatedAt.lt(to));
            }
        }

        let models = query
            .order_by_asc(entity::Column::CreatedAt)
            .order_by_asc(entity::Column::Id)
            .offset(offset)
            .limit((limit > 0).then_some(limit))
            .all(&self.db)
            .await
            .map_err(internal)?;

        Ok(models.into_iter().map(User::from).collect())
    }
}
