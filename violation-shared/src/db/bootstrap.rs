/// One-shot table bootstrap
///
/// Looks for a table in the live schema and, when it is missing, applies the full
/// embedded schema. Pending migrations run through the migration runner; if the
/// table is still absent afterwards (its migration is recorded but the table was
/// dropped), the schema SQL is executed again directly. Every statement in it is
/// `IF NOT EXISTS`. There is no rollback.
///
/// # Example
///
/// ```no_run
/// use violation_shared::db::bootstrap::{ensure_table, BootstrapOutcome, VIOLATION_ACCESS_LOGS};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// match ensure_table(&pool, VIOLATION_ACCESS_LOGS).await? {
///     BootstrapOutcome::Created => println!("created"),
///     BootstrapOutcome::AlreadyExists => println!("nothing to do"),
///     BootstrapOutcome::StillMissing => println!("schema does not define the table"),
/// }
/// # Ok(())
/// # }
/// ```

use sqlx::{Executor, PgPool};
use tracing::{debug, info, warn};

use super::migrations::{run_migrations, MIGRATOR};

/// Table the bootstrap command checks for
pub const VIOLATION_ACCESS_LOGS: &str = "violation_access_logs";

/// Errors raised while bootstrapping
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// Schema inspection failed
    #[error("Failed to inspect schema: {0}")]
    Inspect(#[from] sqlx::Error),

    /// Schema creation failed
    #[error("Failed to create schema: {0}")]
    Create(#[from] sqlx::migrate::MigrateError),

    /// Re-applying the schema SQL failed
    #[error("Failed to apply schema: {0}")]
    Apply(#[source] sqlx::Error),
}

/// What the bootstrap did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// Table was missing and the schema has been created
    Created,

    /// Table was already present; nothing was changed
    AlreadyExists,

    /// Schema was applied but does not define the table
    StillMissing,
}

/// Whether `table` exists in the connection's current schema
pub async fn table_exists(pool: &PgPool, table: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_schema = current_schema()
            AND table_name = $1
        )",
    )
    .bind(table)
    .fetch_one(pool)
    .await
}

/// Executes every up migration's SQL, bypassing the applied-migration ledger
async fn apply_schema(pool: &PgPool) -> Result<(), BootstrapError> {
    for migration in MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration())
    {
        debug!(
            version = migration.version,
            description = %migration.description,
            "Applying schema"
        );
        pool.execute(&*migration.sql).await.map_err(BootstrapError::Apply)?;
    }
    Ok(())
}

/// Creates the schema if `table` is missing
pub async fn ensure_table(pool: &PgPool, table: &str) -> Result<BootstrapOutcome, BootstrapError> {
    if table_exists(pool, table).await? {
        info!(table, "Table already exists");
        return Ok(BootstrapOutcome::AlreadyExists);
    }

    info!(table, "Creating table");
    run_migrations(pool).await?;

    if !table_exists(pool, table).await? {
        warn!(table, "Table missing with migrations recorded, re-applying schema");
        apply_schema(pool).await?;
    }

    if table_exists(pool, table).await? {
        info!(table, "Table created successfully");
        Ok(BootstrapOutcome::Created)
    } else {
        warn!(table, "Schema applied but table is still missing");
        Ok(BootstrapOutcome::StillMissing)
    }
}
