//! Role fixture: a read-only resource. `create`/`update` are not overridden,
//! so the inherited defaults reject writes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crudforge::{CrudResource, PageRequest};

pub mod entity {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "roles")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i64,
        pub name: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

impl From<entity::Model> for Role {
    fn from(model: entity::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleCreate {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleUpdate {
    pub id: i64,
    pub name: Option<String>,
}

#[async_trait]
impl CrudResource for Role {
    type EntityType = entity::Entity;
    type ColumnType = entity::Column;
    type ActiveModelType = entity::ActiveModel;
    type CreateModel = RoleCreate;
    type UpdateModel = RoleUpdate;
    type ListQuery = PageRequest;

    const ID_COLUMN: entity::Column = entity::Column::Id;
    const RESOURCE_ID: &'static str = "role";
}
