//! Soft-delete query policy.
//!
//! A resource picks its deletion mode once, at construction: either rows are
//! flagged deleted and filtered out of default queries, or deletion is a
//! physical row removal. The policy never infers the mode from data.

use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Select, Value};

use crate::errors::ApiError;

/// Which rows a list/detail query sees relative to the deleted flag.
///
/// `Exclude` is the default everywhere; the other scopes exist as explicit
/// overrides and are not wired into any default path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrashedScope {
    /// Only rows whose flag still holds the live sentinel.
    #[default]
    Exclude,
    /// All rows, flagged or not.
    Include,
    /// Only flagged rows.
    Only,
}

/// Flag column plus the sentinel values marking a row live or deleted.
#[derive(Debug, Clone)]
pub struct SoftDelete<C> {
    column: C,
    live: Value,
    deleted: Value,
}

impl<C: ColumnTrait> SoftDelete<C> {
    /// Arbitrary sentinels, e.g. an integer flag where `0` is live.
    pub fn new(column: C, live: impl Into<Value>, deleted: impl Into<Value>) -> Self {
        Self {
            column,
            live: live.into(),
            deleted: deleted.into(),
        }
    }

    /// Boolean flag column, `false` = live.
    pub fn flag(column: C) -> Self {
        Self::new(column, false, true)
    }
}

/// Per-resource deletion mode.
#[derive(Debug, Clone)]
pub enum DeletePolicy<C> {
    /// Delete flips the flag; default queries exclude flagged rows.
    Soft(SoftDelete<C>),
    /// Delete removes rows; queries are unrestricted.
    Hard,
}

impl<C: ColumnTrait> DeletePolicy<C> {
    #[must_use]
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::Soft(_))
    }

    /// Restrict a list/detail query according to the scope.
    ///
    /// Create/update predicates are never touched by the policy; only reads
    /// go through here.
    pub fn scope<E: EntityTrait>(&self, query: Select<E>, scope: TrashedScope) -> Select<E> {
        match (self, scope) {
            (Self::Soft(soft), TrashedScope::Exclude) => {
                query.filter(soft.column.eq(soft.live.clone()))
            }
            (Self::Soft(soft), TrashedScope::Only) => {
                query.filter(soft.column.eq(soft.deleted.clone()))
            }
            _ => query,
        }
    }

    /// Bulk delete by id.
    ///
    /// Soft mode issues one `UPDATE` setting the flag to the deleted sentinel
    /// together with any caller-supplied companion assignments (`payload`);
    /// hard mode issues one `DELETE`. Returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// Fails with a database error when the statement fails.
    pub async fn delete_batch<E>(
        &self,
        db: &DatabaseConnection,
        id_column: C,
        ids: Vec<impl Into<Value> + Send>,
        payload: Vec<(C, Value)>,
    ) -> Result<u64, ApiError>
    where
        E: EntityTrait<Column = C>,
    {
        if ids.is_empty() {
            return Ok(0);
        }
        match self {
            Self::Soft(soft) => {
                let mut update = E::update_many()
                    .col_expr(soft.column, Expr::value(soft.deleted.clone()))
                    .filter(id_column.is_in(ids));
                for (column, value) in payload {
                    update = update.col_expr(column, Expr::value(value));
                }
                let result = update.exec(db).await.map_err(ApiError::database)?;
                Ok(result.rows_affected)
            }
            Self::Hard => {
                let result = E::delete_many()
                    .filter(id_column.is_in(ids))
                    .exec(db)
                    .await
                    .map_err(ApiError::database)?;
                Ok(result.rows_affected)
            }
        }
    }

    /// Bulk restore: flip the flag back to the live sentinel.
    ///
    /// A no-op returning `0` in hard mode, where there is no flag to clear;
    /// callers that must reject restore on hard-delete resources check
    /// [`is_soft`](Self::is_soft) first.
    ///
    /// # Errors
    ///
    /// Fails with a database error when the statement fails.
    pub async fn restore_batch<E>(
        &self,
        db: &DatabaseConnection,
        id_column: C,
        ids: Vec<impl Into<Value> + Send>,
    ) -> Result<u64, ApiError>
    where
        E: EntityTrait<Column = C>,
    {
        match self {
            Self::Soft(soft) => {
                if ids.is_empty() {
                    return Ok(0);
                }
                let result = E::update_many()
                    .col_expr(soft.column, Expr::value(soft.live.clone()))
                    .filter(id_column.is_in(ids))
                    .exec(db)
                    .await
                    .map_err(ApiError::database)?;
                Ok(result.rows_affected)
            }
            Self::Hard => Ok(0),
        }
    }
}
