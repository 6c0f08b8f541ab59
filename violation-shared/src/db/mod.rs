/// Database layer
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: Embedded schema migrations
/// - `bootstrap`: One-shot "create the table if it is missing" check
///
/// Models live in the `models` module at the crate root.
///
/// # Example
///
/// ```no_run
/// use violation_shared::db::pool::{create_pool, DatabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     Ok(())
/// }
/// ```

pub mod bootstrap;
pub mod migrations;
pub mod pool;
