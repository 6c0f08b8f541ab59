/// Field definition model and database operations
///
/// A field definition describes one dynamically configurable input on the violation
/// report form: its machine name, label, input type, whether it is required, select
/// options, validation rules and where it sits in the layout.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE field_definitions (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(100) NOT NULL UNIQUE,
///     label VARCHAR(200) NOT NULL,
///     field_type VARCHAR(50) NOT NULL,
///     required BOOLEAN NOT NULL DEFAULT FALSE,
///     options JSONB,
///     display_order INTEGER NOT NULL DEFAULT 0,
///     active BOOLEAN NOT NULL DEFAULT TRUE,
///     validation JSONB,
///     grid_column INTEGER NOT NULL DEFAULT 0,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// On the wire the type and order columns are called `type` and `order`.
///
/// # Example
///
/// ```no_run
/// use violation_shared::models::field_definition::{CreateField, FieldDefinition};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let input: CreateField = serde_json::from_value(serde_json::json!({
///     "name": "unit_number",
///     "type": "text",
/// }))
/// .unwrap();
///
/// let field = FieldDefinition::create(&pool, input).await?;
/// assert_eq!(field.label, "unit_number");
///
/// let fields = FieldDefinition::list(&pool).await?;
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use validator::Validate;

/// One configurable form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FieldDefinition {
    /// Field ID
    pub id: i64,

    /// Machine name, unique across fields
    pub name: String,

    /// Display label
    pub label: String,

    /// Input type tag (text, select, date, ...)
    #[serde(rename = "type")]
    #[sqlx(rename = "field_type")]
    pub field_type: String,

    /// Whether the form requires a value
    pub required: bool,

    /// Choices for select-like inputs
    pub options: Option<JsonValue>,

    /// Display position; lower sorts first, duplicates allowed
    #[serde(rename = "order")]
    #[sqlx(rename = "display_order")]
    pub order: i32,

    /// Inactive fields are hidden from the report form
    pub active: bool,

    /// Client-side validation rules
    pub validation: Option<JsonValue>,

    /// Layout column (0 = full width)
    pub grid_column: i32,
}

fn default_active() -> bool {
    true
}

/// Input for creating a field
///
/// Only `name` and `type` are required; everything else takes the form builder's defaults.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateField {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50, message = "Type must be 1-50 characters"))]
    pub field_type: String,

    /// Defaults to `name`
    #[serde(default)]
    #[validate(length(max = 200, message = "Label must be at most 200 characters"))]
    pub label: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub options: Option<JsonValue>,

    #[serde(default)]
    pub order: i32,

    #[serde(default = "default_active")]
    pub active: bool,

    #[serde(default)]
    pub validation: Option<JsonValue>,

    #[serde(default)]
    pub grid_column: i32,
}

impl CreateField {
    /// Label to store: the supplied one, or the field name
    pub fn resolved_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// Distinguishes an absent key (`None`) from an explicit `null` (`Some(None)`)
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial update for a field
///
/// Keys missing from the request body leave the stored value untouched. For the
/// nullable JSON columns an explicit `null` clears the value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateField {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 200, message = "Label must be at most 200 characters"))]
    pub label: Option<String>,

    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50, message = "Type must be 1-50 characters"))]
    pub field_type: Option<String>,

    pub required: Option<bool>,

    #[serde(default, deserialize_with = "nullable")]
    pub options: Option<Option<JsonValue>>,

    pub order: Option<i32>,

    pub active: Option<bool>,

    #[serde(default, deserialize_with = "nullable")]
    pub validation: Option<Option<JsonValue>>,

    pub grid_column: Option<i32>,
}

/// Pairs each ID with its position in the requested order
///
/// If an ID appears more than once its last position wins, as the updates are
/// applied in sequence.
pub fn order_assignments(ids: &[i64]) -> impl Iterator<Item = (i64, i32)> + '_ {
    ids.iter().enumerate().map(|(index, id)| (*id, index as i32))
}

impl FieldDefinition {
    /// Overwrites every attribute present in `changes`
    pub fn apply(&mut self, changes: UpdateField) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(label) = changes.label {
            self.label = label;
        }
        if let Some(field_type) = changes.field_type {
            self.field_type = field_type;
        }
        if let Some(required) = changes.required {
            self.required = required;
        }
        if let Some(options) = changes.options {
            self.options = options;
        }
        if let Some(order) = changes.order {
            self.order = order;
        }
        if let Some(active) = changes.active {
            self.active = active;
        }
        if let Some(validation) = changes.validation {
            self.validation = validation;
        }
        if let Some(grid_column) = changes.grid_column {
            self.grid_column = grid_column;
        }
    }

    /// Lists all fields in display order
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, FieldDefinition>(
            r#"
            SELECT id, name, label, field_type, required, options, display_order, active, validation, grid_column
            FROM field_definitions
            ORDER BY display_order ASC, id ASC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Lists active fields in display order
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, FieldDefinition>(
            r#"
            SELECT id, name, label, field_type, required, options, display_order, active, validation, grid_column
            FROM field_definitions
            WHERE active = TRUE
            ORDER BY display_order ASC, id ASC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Finds a field by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, FieldDefinition>(
            r#"
            SELECT id, name, label, field_type, required, options, display_order, active, validation, grid_column
            FROM field_definitions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Creates a field
    ///
    /// # Errors
    ///
    /// Returns a database error with the `field_definitions_name_key` constraint
    /// if the name is already taken.
    pub async fn create(pool: &PgPool, data: CreateField) -> Result<Self, sqlx::Error> {
        let label = data.resolved_label().to_string();

        sqlx::query_as::<_, FieldDefinition>(
            r#"
            INSERT INTO field_definitions
                (name, label, field_type, required, options, display_order, active, validation, grid_column)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, name, label, field_type, required, options, display_order, active, validation, grid_column
            "#,
        )
        .bind(data.name)
        .bind(label)
        .bind(data.field_type)
        .bind(data.required)
        .bind(data.options)
        .bind(data.order)
        .bind(data.active)
        .bind(data.validation)
        .bind(data.grid_column)
        .fetch_one(pool)
        .await
    }

    /// Writes every attribute of this field back to its row
    ///
    /// Returns `None` if the row no longer exists.
    pub async fn save(&self, pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, FieldDefinition>(
            r#"
            UPDATE field_definitions
            SET name = $2,
                label = $3,
                field_type = $4,
                required = $5,
                options = $6,
                display_order = $7,
                active = $8,
                validation = $9,
                grid_column = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, label, field_type, required, options, display_order, active, validation, grid_column
            "#,
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.label)
        .bind(&self.field_type)
        .bind(self.required)
        .bind(&self.options)
        .bind(self.order)
        .bind(self.active)
        .bind(&self.validation)
        .bind(self.grid_column)
        .fetch_optional(pool)
        .await
    }

    /// Applies a partial update to the field with `id`
    ///
    /// Returns `None` if no such field exists.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        changes: UpdateField,
    ) -> Result<Option<Self>, sqlx::Error> {
        let Some(mut field) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        field.apply(changes);
        field.save(pool).await
    }

    /// Deletes a field permanently
    ///
    /// Returns `false` if no such field exists.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM field_definitions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Flips the active flag
    ///
    /// Returns the new value, or `None` if no such field exists.
    pub async fn toggle_active(pool: &PgPool, id: i64) -> Result<Option<bool>, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE field_definitions SET active = NOT active, updated_at = NOW() WHERE id = $1 RETURNING active",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Sets each listed field's order to its index in `ids`
    ///
    /// Unknown IDs are skipped. All updates commit together or not at all.
    /// Returns the number of rows updated.
    pub async fn reorder(pool: &PgPool, ids: &[i64]) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut updated = 0;

        for (id, position) in order_assignments(ids) {
            let result = sqlx::query(
                "UPDATE field_definitions SET display_order = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(id)
            .bind(position)
            .execute(&mut *tx)
            .await?;

            updated += result.rows_affected();
        }

        tx.commit().await?;
        Ok(updated)
    }

    /// Counts all fields
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM field_definitions")
            .fetch_one(pool)
            .await
    }
}
