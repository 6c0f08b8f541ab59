/// Admin settings endpoints
///
/// # Endpoints
///
/// - `POST /api/admin/settings/test-email` - Send a diagnostic email

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::MessageResponse,
};
use axum::{body::Bytes, extract::State, Extension, Json};
use serde::Deserialize;
use tracing::{error, info};
use violation_shared::{
    auth::middleware::AuthContext,
    mail::diagnostics::{explain_failure, test_email},
};

/// Test email request; the whole body is optional
#[derive(Debug, Default, Deserialize)]
pub struct TestEmailRequest {
    /// Recipient; defaults to the caller's email claim
    #[serde(default)]
    pub email: Option<String>,
}

impl TestEmailRequest {
    /// Parses the raw body, treating an empty body or `null` as no options
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        serde_json::from_slice::<Option<Self>>(body)
            .map(Option::unwrap_or_default)
            .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))
    }
}

/// Picks the explicit recipient, falling back to the caller's own address
pub fn resolve_recipient(explicit: Option<String>, claim: Option<&str>) -> Option<String> {
    explicit
        .map(|email| email.trim().to_string())
        .filter(|email| !email.is_empty())
        .or_else(|| claim.map(str::to_string).filter(|email| !email.is_empty()))
}

/// Sends the diagnostic email using the environment SMTP settings
///
/// # Request
///
/// ```json
/// { "email": "admin@example.com" }
/// ```
///
/// # Response
///
/// ```json
/// { "message": "Test email sent to admin@example.com" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: No recipient in the body or the token
/// - `500 Internal Server Error`: Delivery failed; `error` explains the likely cause
pub async fn send_test_email(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    body: Bytes,
) -> ApiResult<Json<MessageResponse>> {
    let request = TestEmailRequest::from_body(&body)?;

    let recipient = resolve_recipient(request.email, auth.email.as_deref())
        .ok_or_else(|| ApiError::BadRequest("No recipient email provided".to_string()))?;

    info!(user_id = %auth.user_id, recipient = %recipient, "Test email requested");
    state.config.mail.log_settings();

    match state.mailer.send(test_email(&recipient)).await {
        Ok(()) => Ok(Json(MessageResponse::new(format!(
            "Test email sent to {}",
            recipient
        )))),
        Err(e) => {
            error!(recipient = %recipient, error = %e, kind = ?e.kind(), "Error sending test email");
            Err(ApiError::EmailDelivery(explain_failure(&e)))
        }
    }
}
