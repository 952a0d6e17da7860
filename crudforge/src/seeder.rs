//! Transactional seeding pipeline.
//!
//! A [`SeedUnit`] is a one-shot script populating a database with fixture or
//! reference data. [`SeedRunner::run`] drives one unit through the full
//! lifecycle: connect, relax referential-integrity checks, clear the unit's
//! truncation targets, invoke `load` (inside a transaction unless disabled),
//! restore checks, disconnect. Relaxing checks lets seed data insert rows
//! with forward-referencing foreign keys without topological insert ordering.
//!
//! A fault inside `load` is caught here: the transaction rolls back, the
//! fault is logged, and the run reports a completed-but-not-committed
//! outcome instead of raising. Seed failures never reach an API response.
//!
//! The runner takes no lock against concurrent seed runs or live API
//! traffic; callers serialize seed invocations externally.

use async_trait::async_trait;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, TransactionTrait,
};

use crate::config::DbConfig;
use crate::errors::ApiError;
use crate::factory::{FactoryRegistry, SeedContext};

/// Environment handed into a seed unit's `load`. Constructed per run, never
/// persisted beyond it.
///
/// `db` is the active transaction on the transactional branch and the bare
/// connection otherwise; entity inserts and raw statements work the same on
/// both.
pub struct SeedEnv<'a, C: ConnectionTrait> {
    pub factories: &'a FactoryRegistry,
    pub ctx: SeedContext,
    pub db: &'a C,
    pub config: &'a DbConfig,
    pub connection_name: &'a str,
    pub truncates: &'a [String],
}

/// One-shot seed script: constructed fresh per run, used once, discarded.
#[async_trait]
pub trait SeedUnit: Send + Sync {
    /// Tables cleared before `load`, in the order given.
    fn truncates(&self) -> &[&str] {
        &[]
    }

    /// Populate the database through `env.db`.
    ///
    /// # Errors
    ///
    /// Any error returned here is caught at the runner boundary: logged,
    /// rolled back on the transactional branch, never re-raised.
    async fn load<C: ConnectionTrait>(
        &mut self,
        env: &mut SeedEnv<'_, C>,
    ) -> Result<(), ApiError>;
}

/// Options for one seed run.
#[derive(Debug, Clone)]
pub struct SeedOptions {
    /// Named connection from the [`DbConfig`]; the default when `None`.
    pub connection: Option<String>,
    /// Wrap `load` in a transaction rolled back on fault.
    pub transaction: bool,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            connection: None,
            transaction: true,
        }
    }
}

/// Outcome of one seed run.
#[derive(Debug, Clone)]
pub struct SeedReport {
    pub connection: String,
    /// Whether the unit's mutations were left in place. `false` after a
    /// rolled-back transactional run or a faulted direct run.
    pub committed: bool,
    /// Message of the fault caught inside `load`, if any.
    pub fault: Option<String>,
}

/// Orchestrates seed units against explicitly supplied configuration and
/// factories.
pub struct SeedRunner {
    config: DbConfig,
    factories: FactoryRegistry,
}

impl SeedRunner {
    #[must_use]
    pub fn new(config: DbConfig, factories: FactoryRegistry) -> Self {
        Self { config, factories }
    }

    #[must_use]
    pub fn factories(&self) -> &FactoryRegistry {
        &self.factories
    }

    /// Run one seed unit through the full lifecycle.
    ///
    /// # Errors
    ///
    /// Fails on infrastructure errors only: unknown connection name,
    /// connect/transaction/statement failures, close failures. A fault
    /// raised inside the unit's `load` is NOT an error here — it is logged
    /// and reported via [`SeedReport::fault`].
    pub async fn run<U: SeedUnit>(
        &self,
        unit: &mut U,
        options: SeedOptions,
    ) -> Result<SeedReport, ApiError> {
        let name = options
            .connection
            .as_deref()
            .unwrap_or_else(|| self.config.default_connection());
        let url = self.config.url(Some(name))?;

        // One session for the whole run, so the session-scoped constraint
        // toggles below cover every statement the unit issues.
        let mut connect = ConnectOptions::new(url);
        connect.max_connections(1).sqlx_logging(false);
        let db = Database::connect(connect).await.map_err(ApiError::database)?;

        tracing::info!(
            connection = name,
            transactional = options.transaction,
            "seed run started"
        );

        relax_constraints(&db).await?;

        let truncates: Vec<String> = unit.truncates().iter().map(ToString::to_string).collect();

        let report = if options.transaction {
            self.run_transactional(unit, &db, name, &truncates).await?
        } else {
            self.run_direct(unit, &db, name, &truncates).await?
        };

        db.close().await.map_err(ApiError::database)?;

        tracing::info!(
            connection = name,
            committed = report.committed,
            "seed run finished"
        );
        Ok(report)
    }

    async fn run_transactional<U: SeedUnit>(
        &self,
        unit: &mut U,
        db: &DatabaseConnection,
        name: &str,
        truncates: &[String],
    ) -> Result<SeedReport, ApiError> {
        let txn = db.begin().await.map_err(ApiError::database)?;
        truncate_tables(&txn, truncates).await?;

        let mut env = SeedEnv {
            factories: &self.factories,
            ctx: SeedContext::new(),
            db: &txn,
            config: &self.config,
            connection_name: name,
            truncates,
        };
        let outcome = unit.load(&mut env).await;
        drop(env);

        match outcome {
            Ok(()) => {
                restore_constraints(&txn).await?;
                txn.commit().await.map_err(ApiError::database)?;
                Ok(SeedReport {
                    connection: name.to_string(),
                    committed: true,
                    fault: None,
                })
            }
            Err(fault) => {
                tracing::error!(connection = name, error = %fault, "seed unit failed, rolling back");
                txn.rollback().await.map_err(ApiError::database)?;
                restore_constraints(db).await?;
                Ok(SeedReport {
                    connection: name.to_string(),
                    committed: false,
                    fault: Some(fault.to_string()),
                })
            }
        }
    }

    async fn run_direct<U: SeedUnit>(
        &self,
        unit: &mut U,
        db: &DatabaseConnection,
        name: &str,
        truncates: &[String],
    ) -> Result<SeedReport, ApiError> {
        truncate_tables(db, truncates).await?;

        let mut env = SeedEnv {
            factories: &self.factories,
            ctx: SeedContext::new(),
            db,
            config: &self.config,
            connection_name: name,
            truncates,
        };
        let outcome = unit.load(&mut env).await;
        drop(env);

        // No transaction to undo partial work: whatever was inserted before
        // a fault stays. Checks are restored regardless.
        restore_constraints(db).await?;

        match outcome {
            Ok(()) => Ok(SeedReport {
                connection: name.to_string(),
                committed: true,
                fault: None,
            }),
            Err(fault) => {
                tracing::error!(connection = name, error = %fault, "seed unit failed");
                Ok(SeedReport {
                    connection: name.to_string(),
                    committed: false,
                    fault: Some(fault.to_string()),
                })
            }
        }
    }
}

/// Thin CLI-facing entry point: construct a runner and drive one unit.
///
/// # Errors
///
/// Propagates infrastructure errors from [`SeedRunner::run`].
pub async fn run_seeder<U: SeedUnit>(
    mut unit: U,
    options: SeedOptions,
    config: &DbConfig,
    factories: FactoryRegistry,
) -> Result<SeedReport, ApiError> {
    let runner = SeedRunner::new(config.clone(), factories);
    runner.run(&mut unit, options).await
}

/// Disable referential-integrity checks for the session.
async fn relax_constraints<C: ConnectionTrait>(db: &C) -> Result<(), ApiError> {
    let sql = match db.get_database_backend() {
        DbBackend::Sqlite => "PRAGMA foreign_keys = OFF",
        DbBackend::MySql => "SET FOREIGN_KEY_CHECKS = 0",
        DbBackend::Postgres => "SET session_replication_role = 'replica'",
    };
    db.execute_unprepared(sql).await.map_err(ApiError::database)?;
    Ok(())
}

/// Re-enable referential-integrity checks for the session.
async fn restore_constraints<C: ConnectionTrait>(db: &C) -> Result<(), ApiError> {
    let sql = match db.get_database_backend() {
        DbBackend::Sqlite => "PRAGMA foreign_keys = ON",
        DbBackend::MySql => "SET FOREIGN_KEY_CHECKS = 1",
        DbBackend::Postgres => "SET session_replication_role = 'origin'",
    };
    db.execute_unprepared(sql).await.map_err(ApiError::database)?;
    Ok(())
}

/// Clear the unit's truncation targets. `DELETE FROM` rather than
/// `TRUNCATE`: MySQL `TRUNCATE` is DDL and implicitly commits, which would
/// break the transactional branch.
async fn truncate_tables<C: ConnectionTrait>(db: &C, tables: &[String]) -> Result<(), ApiError> {
    for table in tables {
        db.execute_unprepared(&format!("DELETE FROM {table}"))
            .await
            .map_err(ApiError::database)?;
    }
    Ok(())
}
