/// Error handling for the API server
///
/// All handlers return `ApiResult<T>`; the error side maps to an HTTP status and a
/// JSON body of the form `{"error": "..."}`. 401 responses add a `message` and 422
/// responses add the per-field `details`.
///
/// # Example
///
/// ```
/// use violation_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler(found: bool) -> ApiResult<Json<serde_json::Value>> {
///     if !found {
///         return Err(ApiError::NotFound("Field not found".to_string()));
///     }
///     Ok(Json(json!({ "message": "ok" })))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use violation_shared::auth::{
    authorization::{AuthzError, ADMIN_REQUIRED_MESSAGE},
    jwt::JwtError,
    middleware::AuthError,
};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409), e.g. duplicate field name
    Conflict(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Email could not be delivered (500); the explanation is shown to the admin
    EmailDelivery(String),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Extra detail for authentication failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Per-field validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::EmailDelivery(msg) => write!(f, "Email delivery failed: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::plain(msg)),
            ApiError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse {
                    error: "Unauthorized".to_string(),
                    message: Some(msg),
                    details: None,
                },
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, ErrorResponse::plain(msg)),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::plain(msg)),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, ErrorResponse::plain(msg)),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse {
                    error: "Validation failed".to_string(),
                    message: None,
                    details: Some(errors),
                },
            ),
            ApiError::EmailDelivery(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::plain(msg),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::plain("An internal error occurred".to_string()),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl ErrorResponse {
    fn plain(error: String) -> Self {
        Self {
            error,
            message: None,
            details: None,
        }
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    return match db_err.constraint() {
                        Some(constraint) if constraint.contains("name") => {
                            ApiError::Conflict("A field with this name already exists".to_string())
                        }
                        Some(constraint) => {
                            ApiError::Conflict(format!("Constraint violation: {}", constraint))
                        }
                        None => ApiError::Conflict("Duplicate value".to_string()),
                    };
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert validator errors to API errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::ValidationError(details)
    }
}

/// Convert authorization errors to API errors
impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::AdminRequired { .. } => {
                ApiError::Forbidden(ADMIN_REQUIRED_MESSAGE.to_string())
            }
        }
    }
}

/// Convert authentication errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidFormat(msg) => ApiError::BadRequest(msg),
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        AuthError::from(err).into()
    }
}
