//! Member fixture: a writable, soft-deletable resource with an integer
//! deleted flag and a snowflake id scheme.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection, EntityTrait, IntoActiveModel};
use serde::{Deserialize, Serialize};

use crudforge::{
    ApiError, CrudResource, DeletePolicy, PageRequest, SoftDelete, snowflake_id,
};

use super::factories::hash_secret;

pub mod entity {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "members")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i64,
        pub account: String,
        pub display_name: String,
        pub password: String,
        pub role_id: i64,
        pub is_deleted: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// API-facing shape; the password column never leaves the database layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub account: String,
    pub display_name: String,
    pub role_id: i64,
}

impl From<entity::Model> for Member {
    fn from(model: entity::Model) -> Self {
        Self {
            id: model.id,
            account: model.account,
            display_name: model.display_name,
            role_id: model.role_id,
        }
    }
}

/// Full writable shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberCreate {
    pub account: String,
    pub display_name: String,
    pub password: String,
    pub role_id: i64,
}

/// Partial shape carrying its own id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberUpdate {
    pub id: i64,
    pub display_name: Option<String>,
    pub password: Option<String>,
}

#[async_trait]
impl CrudResource for Member {
    type EntityType = entity::Entity;
    type ColumnType = entity::Column;
    type ActiveModelType = entity::ActiveModel;
    type CreateModel = MemberCreate;
    type UpdateModel = MemberUpdate;
    type ListQuery = PageRequest;

    const ID_COLUMN: entity::Column = entity::Column::Id;
    const RESOURCE_ID: &'static str = "member";

    fn delete_policy() -> DeletePolicy<entity::Column> {
        DeletePolicy::Soft(SoftDelete::new(entity::Column::IsDeleted, 0, 1))
    }

    async fn create(db: &DatabaseConnection, data: MemberCreate) -> Result<Self, ApiError> {
        let model = entity::ActiveModel {
            id: Set(snowflake_id()),
            account: Set(data.account),
            display_name: Set(data.display_name),
            password: Set(hash_secret(&data.password)),
            role_id: Set(data.role_id),
            is_deleted: Set(0),
        };
        let model = model.insert(db).await.map_err(ApiError::database)?;
        Ok(model.into())
    }

    async fn update(db: &DatabaseConnection, data: MemberUpdate) -> Result<Self, ApiError> {
        let existing = entity::Entity::find_by_id(data.id)
            .one(db)
            .await
            .map_err(ApiError::database)?
            .ok_or_else(|| ApiError::not_found("member", Some(data.id.to_string())))?;
        let mut active = existing.into_active_model();
        if let Some(display_name) = data.display_name {
            active.display_name = Set(display_name);
        }
        if let Some(password) = data.password {
            active.password = Set(hash_secret(&password));
        }
        let model = active.update(db).await.map_err(ApiError::database)?;
        Ok(model.into())
    }
}
