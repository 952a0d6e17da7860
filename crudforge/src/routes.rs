//! Declarative CRUD-route synthesis.
//!
//! A [`CrudDescriptor`] names which of the five standard operations a
//! resource exposes and how each is customized; [`synthesize_routes`] turns
//! it into an [`axum::Router`] of handlers bound to the resource's
//! [`CrudResource`] implementation, plus per-operation metadata
//! (serialization groups, hook-attached tags). Operations the resource
//! implements manually are skipped entirely — the caller merges its own
//! routes for those.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
};
use sea_orm::DatabaseConnection;
use serde::{Serialize, de::DeserializeOwned};

use crate::errors::ApiError;
use crate::models::{DeleteOutcome, DeleteRequest, Page};
use crate::traits::{CrudResource, PrimaryKeyValue};

/// The fixed set of five synthesizable operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrudOperation {
    List,
    Detail,
    Create,
    Update,
    Delete,
}

impl CrudOperation {
    pub const ALL: [Self; 5] = [
        Self::List,
        Self::Detail,
        Self::Create,
        Self::Update,
        Self::Delete,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Detail => "detail",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Transport verb, fixed and non-configurable.
    #[must_use]
    pub const fn method(self) -> &'static str {
        match self {
            Self::List | Self::Detail => "GET",
            Self::Create => "POST",
            Self::Update => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Route path, fixed and non-configurable.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Detail => "/{id}",
            _ => "/",
        }
    }
}

impl FromStr for CrudOperation {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(Self::List),
            "detail" => Ok(Self::Detail),
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            other => Err(ApiError::configuration(format!(
                "unknown CRUD operation '{other}'"
            ))),
        }
    }
}

impl fmt::Display for CrudOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Response-serialization grouping for one operation.
#[derive(Debug, Clone, Default)]
pub enum SerializeRule {
    /// `"<resource>-detail"` for detail/create/update/delete,
    /// `"<resource>-list"` for list.
    #[default]
    Default,
    /// Clear all grouping.
    NoGroup,
    /// Explicit groups.
    Groups(Vec<String>),
}

/// Hook invoked with the bound operation after binding, serialization and
/// transport are settled. Attaches documentation or access-control metadata
/// without coupling the synthesis engine to those concerns.
pub type PostBindHook = Arc<dyn Fn(&mut BoundOperation) + Send + Sync>;

/// Per-operation customization.
#[derive(Clone, Default)]
pub struct OpOptions {
    pub serialize: SerializeRule,
    pub hook: Option<PostBindHook>,
}

impl OpOptions {
    #[must_use]
    pub fn serialize(mut self, rule: SerializeRule) -> Self {
        self.serialize = rule;
        self
    }

    #[must_use]
    pub fn hook(mut self, hook: impl Fn(&mut BoundOperation) + Send + Sync + 'static) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }
}

/// Declarative configuration for one resource's synthesized routes.
///
/// Operation names are validated at synthesis time; anything outside the
/// fixed set of five is a configuration error. Duplicates collapse to the
/// first occurrence.
#[derive(Clone, Default)]
pub struct CrudDescriptor {
    pub resource_id: String,
    enabled: Vec<(String, OpOptions)>,
    manual: Vec<String>,
}

impl CrudDescriptor {
    #[must_use]
    pub fn new(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            enabled: Vec::new(),
            manual: Vec::new(),
        }
    }

    /// Enable an operation with default options.
    #[must_use]
    pub fn enable(self, name: impl Into<String>) -> Self {
        self.enable_with(name, OpOptions::default())
    }

    /// Enable an operation with explicit options.
    #[must_use]
    pub fn enable_with(mut self, name: impl Into<String>, options: OpOptions) -> Self {
        self.enabled.push((name.into(), options));
        self
    }

    /// Declare an operation the resource implements manually. It is never
    /// overwritten: synthesis skips it and applies none of its options.
    #[must_use]
    pub fn manual(mut self, name: impl Into<String>) -> Self {
        self.manual.push(name.into());
        self
    }
}

/// One synthesized operation and the metadata attached to it.
#[derive(Debug, Clone)]
pub struct BoundOperation {
    pub operation: CrudOperation,
    pub method: &'static str,
    pub path: &'static str,
    pub serialize_groups: Vec<String>,
    /// Free-form key/value metadata attached by post-bind hooks.
    pub metadata: Vec<(String, String)>,
}

/// Output of [`synthesize_routes`].
pub struct CrudRouter {
    pub router: Router,
    pub operations: Vec<BoundOperation>,
}

impl std::fmt::Debug for CrudRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrudRouter")
            .field("operations", &self.operations)
            .finish_non_exhaustive()
    }
}

/// Validate, deduplicate and order the descriptor's operations.
fn resolve_operations(
    descriptor: &CrudDescriptor,
) -> Result<Vec<(CrudOperation, &OpOptions)>, ApiError> {
    let mut manual = Vec::new();
    for name in &descriptor.manual {
        manual.push(name.parse::<CrudOperation>()?);
    }
    let mut operations: Vec<(CrudOperation, &OpOptions)> = Vec::new();
    for (name, options) in &descriptor.enabled {
        let operation = name.parse::<CrudOperation>()?;
        if manual.contains(&operation) || operations.iter().any(|(seen, _)| *seen == operation) {
            continue;
        }
        operations.push((operation, options));
    }
    Ok(operations)
}

fn default_groups(resource_id: &str, operation: CrudOperation) -> Vec<String> {
    match operation {
        CrudOperation::List => vec![format!("{resource_id}-list")],
        _ => vec![format!("{resource_id}-detail")],
    }
}

/// Synthesize the routes a descriptor enables for resource `R`.
///
/// Invoked once at startup per resource. Handlers are bound against `R`'s
/// [`CrudResource`] operations; input shapes come from `R`'s associated
/// types. The returned router is ready to be nested under the resource's
/// path prefix and merged with any manually implemented routes.
///
/// # Errors
///
/// Fails with a configuration error when the descriptor names an operation
/// outside the fixed set of five.
pub fn synthesize_routes<R>(
    db: &DatabaseConnection,
    descriptor: &CrudDescriptor,
) -> Result<CrudRouter, ApiError>
where
    R: CrudResource + Serialize + 'static,
    R::CreateModel: DeserializeOwned + 'static,
    R::UpdateModel: DeserializeOwned + 'static,
    R::ListQuery: DeserializeOwned + 'static,
    PrimaryKeyValue<R>: DeserializeOwned + 'static,
{
    let mut router: Router<DatabaseConnection> = Router::new();
    let mut operations = Vec::new();

    for (operation, options) in resolve_operations(descriptor)? {
        router = match operation {
            CrudOperation::List => router.route("/", get(list_handler::<R>)),
            CrudOperation::Detail => router.route("/{id}", get(detail_handler::<R>)),
            CrudOperation::Create => router.route("/", post(create_handler::<R>)),
            CrudOperation::Update => router.route("/", patch(update_handler::<R>)),
            CrudOperation::Delete => router.route("/", delete(delete_handler::<R>)),
        };

        let mut bound = BoundOperation {
            operation,
            method: operation.method(),
            path: operation.path(),
            serialize_groups: match &options.serialize {
                SerializeRule::Default => default_groups(&descriptor.resource_id, operation),
                SerializeRule::NoGroup => Vec::new(),
                SerializeRule::Groups(groups) => groups.clone(),
            },
            metadata: Vec::new(),
        };
        if let Some(hook) = &options.hook {
            hook(&mut bound);
        }
        operations.push(bound);
    }

    Ok(CrudRouter {
        router: router.with_state(db.clone()),
        operations,
    })
}

async fn list_handler<R>(
    State(db): State<DatabaseConnection>,
    Query(query): Query<R::ListQuery>,
) -> Result<Json<Page<R>>, ApiError>
where
    R: CrudResource + Serialize,
    R::ListQuery: DeserializeOwned,
{
    let page = R::paginate(&db, query.into(), |query| query).await?;
    Ok(Json(page))
}

async fn detail_handler<R>(
    State(db): State<DatabaseConnection>,
    Path(id): Path<PrimaryKeyValue<R>>,
) -> Result<Json<R>, ApiError>
where
    R: CrudResource + Serialize,
    PrimaryKeyValue<R>: DeserializeOwned,
{
    let record = R::detail(&db, id).await?;
    Ok(Json(record))
}

async fn create_handler<R>(
    State(db): State<DatabaseConnection>,
    Json(data): Json<R::CreateModel>,
) -> Result<(StatusCode, Json<R>), ApiError>
where
    R: CrudResource + Serialize,
    R::CreateModel: DeserializeOwned,
{
    let record = R::create(&db, data).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_handler<R>(
    State(db): State<DatabaseConnection>,
    Json(data): Json<R::UpdateModel>,
) -> Result<Json<R>, ApiError>
where
    R: CrudResource + Serialize,
    R::UpdateModel: DeserializeOwned,
{
    let record = R::update(&db, data).await?;
    Ok(Json(record))
}

async fn delete_handler<R>(
    State(db): State<DatabaseConnection>,
    Json(request): Json<DeleteRequest<PrimaryKeyValue<R>>>,
) -> Result<Json<DeleteOutcome>, ApiError>
where
    R: CrudResource,
    PrimaryKeyValue<R>: DeserializeOwned,
{
    let outcome = R::delete_batch(&db, request.ids).await?;
    Ok(Json(outcome))
}
