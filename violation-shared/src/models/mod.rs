/// Database models
///
/// # Models
///
/// - `field_definition`: Configurable fields on the violation report form
///
/// # Example
///
/// ```no_run
/// use violation_shared::models::field_definition::FieldDefinition;
/// use violation_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
///
/// for field in FieldDefinition::list_active(&pool).await? {
///     println!("{} ({})", field.label, field.field_type);
/// }
/// # Ok(())
/// # }
/// ```

pub mod field_definition;
