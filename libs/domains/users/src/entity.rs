//! SeaORM entity for the `users` table

use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::models::User;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub nickname: String,
    /// Argon2 PHC string
    pub password: String,
    #[sea_orm(unique)]
    pub email: String,
    pub country: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            nickname: model.nickname,
            email: model.email,
            country: model.country,
            password_hash: model.password,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl ActiveModel {
    /// Columns written on insert and update. Timestamps are left to the
    /// database defaults and trigger.
    pub fn from_user(user: User) -> Self {
        Self {
            id: Set(user.id),
            first_name: Set(user.first_name),
            last_name: Set(user.last_name),
            nickname: Set(user.nickname),
            password: Set(user.password_hash),
            email: Set(user.email),
            country: Set(user.country),
            ..Default::default()
        }
    }
}
