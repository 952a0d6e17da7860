pub mod config;
pub mod errors;
pub mod factory;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod seeder;
pub mod soft_delete;
pub mod traits;

pub use config::{DEFAULT_CONNECTION, DbConfig};
pub use errors::ApiError;
pub use factory::{BoundFactory, FactoryRegistry, SeedContext, snowflake_id};
pub use models::{DeleteOutcome, DeleteRequest, Page, PageMeta, PageRequest};
pub use routes::{
    BoundOperation, CrudDescriptor, CrudOperation, CrudRouter, OpOptions, SerializeRule,
    synthesize_routes,
};
pub use seeder::{SeedEnv, SeedOptions, SeedReport, SeedRunner, SeedUnit, run_seeder};
pub use soft_delete::{DeletePolicy, SoftDelete, TrashedScope};
pub use traits::{CrudResource, PrimaryKeyValue};
