/// Field definition endpoints
///
/// # Endpoints
///
/// - `GET /api/fields` - List all fields (admin)
/// - `GET /api/fields/active` - List active fields through the cache (any user)
/// - `POST /api/fields` - Create a field (admin)
/// - `PUT /api/fields/:id` - Partially update a field (admin)
/// - `DELETE /api/fields/:id` - Delete a field (admin)
/// - `POST /api/fields/:id/toggle` - Flip the active flag (admin)
/// - `POST /api/fields/reorder` - Assign display order from a list of IDs (admin)
///
/// Every successful mutation invalidates the field cache.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::MessageResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;
use violation_shared::{
    cache::{invalidate_after_mutation, load_active_fields},
    models::field_definition::{CreateField, FieldDefinition, UpdateField},
};

/// Create response
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub message: String,

    /// ID of the new field
    pub id: i64,
}

/// Toggle response
#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub message: String,

    /// Active flag after the toggle
    pub active: bool,
}

/// Reorder request
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    /// Field IDs in their new display order
    pub order: Vec<i64>,
}

fn field_not_found() -> ApiError {
    ApiError::NotFound("Field not found".to_string())
}

/// Lists every field in display order
pub async fn list_fields(State(state): State<AppState>) -> ApiResult<Json<Vec<FieldDefinition>>> {
    let fields = FieldDefinition::list(&state.db).await?;
    Ok(Json(fields))
}

/// Lists active fields, served from the field cache when warm
pub async fn list_active_fields(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<FieldDefinition>>> {
    let fields = load_active_fields(state.field_cache.as_ref(), &state.db).await?;
    Ok(Json(fields))
}

/// Creates a field
///
/// # Request
///
/// ```json
/// {
///   "name": "parking_stall",
///   "type": "text",
///   "label": "Parking Stall",
///   "required": true,
///   "grid_column": 6
/// }
/// ```
///
/// # Response
///
/// `201 Created` with `{"message": "Field created", "id": 12}`
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Empty name or type
/// - `409 Conflict`: Name already taken
pub async fn create_field(
    State(state): State<AppState>,
    Json(input): Json<CreateField>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    input.validate()?;

    let field = FieldDefinition::create(&state.db, input).await?;
    invalidate_after_mutation(state.field_cache.as_ref()).await;

    info!(field_id = field.id, name = %field.name, "Field created");

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Field created".to_string(),
            id: field.id,
        }),
    ))
}

/// Applies a partial update
///
/// Attributes missing from the body are left unchanged; `null` clears
/// `options` or `validation`.
pub async fn update_field(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(changes): Json<UpdateField>,
) -> ApiResult<Json<MessageResponse>> {
    changes.validate()?;

    FieldDefinition::update(&state.db, id, changes)
        .await?
        .ok_or_else(field_not_found)?;
    invalidate_after_mutation(state.field_cache.as_ref()).await;

    info!(field_id = id, "Field updated");
    Ok(Json(MessageResponse::new("Field updated")))
}

/// Deletes a field permanently
pub async fn delete_field(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    if !FieldDefinition::delete(&state.db, id).await? {
        return Err(field_not_found());
    }
    invalidate_after_mutation(state.field_cache.as_ref()).await;

    info!(field_id = id, "Field deleted");
    Ok(Json(MessageResponse::new("Field deleted")))
}

/// Flips a field's active flag and returns the new value
pub async fn toggle_field(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ToggleResponse>> {
    let active = FieldDefinition::toggle_active(&state.db, id)
        .await?
        .ok_or_else(field_not_found)?;
    invalidate_after_mutation(state.field_cache.as_ref()).await;

    info!(field_id = id, active, "Field toggled");
    Ok(Json(ToggleResponse {
        message: "Field toggled".to_string(),
        active,
    }))
}

/// Sets each listed field's order to its position in the list
///
/// Unknown IDs are skipped.
pub async fn reorder_fields(
    State(state): State<AppState>,
    Json(req): Json<ReorderRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let updated = FieldDefinition::reorder(&state.db, &req.order).await?;
    invalidate_after_mutation(state.field_cache.as_ref()).await;

    info!(requested = req.order.len(), updated, "Fields reordered");
    Ok(Json(MessageResponse::new("Fields reordered")))
}
