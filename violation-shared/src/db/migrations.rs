/// Database migration runner
///
/// Migrations live in the workspace-level `migrations/` directory and are embedded
/// into the binary at compile time with `sqlx::migrate!`.
///
/// # Example
///
/// ```no_run
/// use violation_shared::db::pool::{create_pool, DatabaseConfig};
/// use violation_shared::db::migrations::{run_migrations, MIGRATOR};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
///
/// run_migrations(&pool).await?;
/// println!("Schema has {} migrations", MIGRATOR.iter().count());
/// # Ok(())
/// # }
/// ```

use sqlx::{migrate::Migrator, postgres::PgPool};
use tracing::{info, warn};

/// Embedded migrations
pub static MIGRATOR: Migrator = sqlx::migrate!("../migrations");

/// Runs all pending database migrations
///
/// Already-applied migrations are skipped, so running this twice is a no-op.
///
/// # Errors
///
/// Returns an error if a migration fails to apply or has been modified since it
/// was applied.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!(migrations = MIGRATOR.iter().count(), "Running database migrations");

    match MIGRATOR.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_migrations_present() {
        let descriptions: Vec<_> = MIGRATOR
            .iter()
            .map(|m| m.description.to_string())
            .collect();

        assert!(descriptions.iter().any(|d| d.contains("field definitions")));
        assert!(descriptions.iter().any(|d| d.contains("violation access logs")));
    }
}
