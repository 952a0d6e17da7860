use async_trait::async_trait;
use sea_orm::{
    DatabaseConnection, EntityTrait, QueryFilter, Select, Value, entity::prelude::*,
};

use crate::errors::ApiError;
use crate::models::{DeleteOutcome, Page, PageRequest};
use crate::pagination;
use crate::soft_delete::{DeletePolicy, TrashedScope};

/// Primary-key value type of a resource's entity.
pub type PrimaryKeyValue<R> =
    <<<R as CrudResource>::EntityType as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType;

/// Generic data-access operations any resource inherits unless overridden.
///
/// Read operations compose the resource's [`DeletePolicy`] with an optional
/// refinement hook — a `FnOnce(Select) -> Select` closure injecting arbitrary
/// predicates, sorts or joins before execution (`|query| query` for none).
/// Write defaults fail with `Unsupported`; concrete resources override them.
#[async_trait]
pub trait CrudResource: Sized + Send + Sync
where
    Self::EntityType: EntityTrait<Column = Self::ColumnType> + Sync,
    <Self::EntityType as EntityTrait>::Model: Sync,
    <<Self::EntityType as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType:
        Into<Value> + Clone + Send + Sync,
    Self: From<<Self::EntityType as EntityTrait>::Model>,
{
    type EntityType: EntityTrait<Column = Self::ColumnType> + Sync;
    type ColumnType: ColumnTrait + std::fmt::Debug;
    type ActiveModelType: ActiveModelTrait<Entity = Self::EntityType> + Send;
    /// Full writable shape, consumed by `create`.
    type CreateModel: Send;
    /// Partial shape carrying its own id, consumed by `update`.
    type UpdateModel: Send;
    /// List input shape; pagination-only unless the resource adds to it.
    type ListQuery: Into<PageRequest> + Send;

    const ID_COLUMN: Self::ColumnType;
    const RESOURCE_ID: &'static str;

    /// Deletion mode, chosen once per resource.
    #[must_use]
    fn delete_policy() -> DeletePolicy<Self::ColumnType> {
        DeletePolicy::Hard
    }

    /// Companion assignments written alongside the flag on soft delete
    /// (e.g. a deletion timestamp column).
    #[must_use]
    fn soft_delete_payload() -> Vec<(Self::ColumnType, Value)> {
        Vec::new()
    }

    /// Base query with the default deleted-row exclusion applied.
    #[must_use]
    fn base_query() -> Select<Self::EntityType> {
        Self::base_query_scoped(TrashedScope::Exclude)
    }

    /// Base query under an explicit trashed-inclusion scope.
    #[must_use]
    fn base_query_scoped(scope: TrashedScope) -> Select<Self::EntityType> {
        Self::delete_policy().scope(Self::EntityType::find(), scope)
    }

    /// Fetch all records visible under the default scope.
    ///
    /// # Errors
    ///
    /// Fails with a database error when the query fails.
    async fn list(db: &DatabaseConnection) -> Result<Vec<Self>, ApiError> {
        Self::list_with(db, |query| query).await
    }

    /// Fetch all records, refining the base query first.
    ///
    /// # Errors
    ///
    /// Fails with a database error when the query fails.
    async fn list_with<F>(db: &DatabaseConnection, refine: F) -> Result<Vec<Self>, ApiError>
    where
        F: FnOnce(Select<Self::EntityType>) -> Select<Self::EntityType> + Send,
    {
        let models = refine(Self::base_query())
            .all(db)
            .await
            .map_err(ApiError::database)?;
        Ok(models.into_iter().map(Self::from).collect())
    }

    /// Fetch one page of records plus metadata.
    ///
    /// The same refined query feeds both the item fetch and the row count.
    ///
    /// # Errors
    ///
    /// Fails with a database error when either statement fails.
    async fn paginate<F>(
        db: &DatabaseConnection,
        request: PageRequest,
        refine: F,
    ) -> Result<Page<Self>, ApiError>
    where
        F: FnOnce(Select<Self::EntityType>) -> Select<Self::EntityType> + Send,
    {
        let page = pagination::paginate(db, refine(Self::base_query()), request)
            .await
            .map_err(ApiError::database)?;
        Ok(page.map(Self::from))
    }

    /// Fetch one record by id under the default scope.
    ///
    /// # Errors
    ///
    /// Fails with `NotFound` when no visible row matches.
    async fn detail(db: &DatabaseConnection, id: PrimaryKeyValue<Self>) -> Result<Self, ApiError> {
        Self::detail_with(db, id, |query| query).await
    }

    /// Fetch one record by id, refining the by-id query first.
    ///
    /// # Errors
    ///
    /// Fails with `NotFound` when no visible row matches.
    async fn detail_with<F>(
        db: &DatabaseConnection,
        id: PrimaryKeyValue<Self>,
        refine: F,
    ) -> Result<Self, ApiError>
    where
        F: FnOnce(Select<Self::EntityType>) -> Select<Self::EntityType> + Send,
    {
        let query = refine(Self::base_query().filter(Self::ID_COLUMN.eq(id.clone())));
        match query.one(db).await.map_err(ApiError::database)? {
            Some(model) => Ok(Self::from(model)),
            None => {
                let id: Value = id.into();
                Err(ApiError::not_found(Self::RESOURCE_ID, Some(format!("{id:?}"))))
            }
        }
    }

    /// Create a record.
    ///
    /// # Errors
    ///
    /// Fails with `Unsupported` unless the resource overrides it, so
    /// read-only resources need not disable their write paths.
    async fn create(db: &DatabaseConnection, data: Self::CreateModel) -> Result<Self, ApiError> {
        let _ = (db, data);
        Err(ApiError::unsupported(Self::RESOURCE_ID, "create"))
    }

    /// Update a record.
    ///
    /// # Errors
    ///
    /// Fails with `Unsupported` unless the resource overrides it.
    async fn update(db: &DatabaseConnection, data: Self::UpdateModel) -> Result<Self, ApiError> {
        let _ = (db, data);
        Err(ApiError::unsupported(Self::RESOURCE_ID, "update"))
    }

    /// Bulk delete, dispatching to the resource's [`DeletePolicy`].
    ///
    /// # Errors
    ///
    /// Fails with a database error when the statement fails.
    async fn delete_batch(
        db: &DatabaseConnection,
        ids: Vec<PrimaryKeyValue<Self>>,
    ) -> Result<DeleteOutcome, ApiError> {
        let affected = Self::delete_policy()
            .delete_batch::<Self::EntityType>(db, Self::ID_COLUMN, ids, Self::soft_delete_payload())
            .await?;
        Ok(DeleteOutcome { affected })
    }

    /// Bulk restore of soft-deleted records, clearing the flag with no other
    /// data loss.
    ///
    /// # Errors
    ///
    /// Fails with `Unsupported` on a hard-delete resource.
    async fn restore_batch(
        db: &DatabaseConnection,
        ids: Vec<PrimaryKeyValue<Self>>,
    ) -> Result<DeleteOutcome, ApiError> {
        let policy = Self::delete_policy();
        if !policy.is_soft() {
            return Err(ApiError::unsupported(Self::RESOURCE_ID, "restore"));
        }
        let affected = policy
            .restore_batch::<Self::EntityType>(db, Self::ID_COLUMN, ids)
            .await?;
        Ok(DeleteOutcome { affected })
    }
}
