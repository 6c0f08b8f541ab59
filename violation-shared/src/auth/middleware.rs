/// Request authentication for Axum
///
/// Extracts the caller's access token from the request and validates it into an
/// [`AuthContext`]. The API's authentication layer calls [`authenticate`] and
/// inserts the context into the request extensions.
///
/// # Token Locations
///
/// Checked in order:
/// 1. `Authorization: Bearer <token>` header
/// 2. `access_token_cookie` cookie (set by the browser login flow)
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use violation_shared::auth::jwt::{create_token, Claims, TokenType};
/// use violation_shared::auth::middleware::authenticate;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "your-secret-key-at-least-32-bytes-long";
/// let token = create_token(&Claims::new("1", TokenType::Access), secret)?;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::COOKIE, HeaderValue::from_str(&format!("access_token_cookie={}", token))?);
///
/// let auth = authenticate(&headers, secret)?;
/// assert_eq!(auth.user_id, "1");
/// # Ok(())
/// # }
/// ```

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::jwt::{validate_access_token, Claims, JwtError};

/// Name of the cookie carrying the access token
pub const ACCESS_TOKEN_COOKIE: &str = "access_token_cookie";

/// Authentication context added to request extensions
///
/// Built from a validated claim set and trusted only for the lifetime of one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user identity (`sub` claim)
    pub user_id: String,

    /// Whether the caller holds the admin flag
    pub is_admin: bool,

    /// Caller's email, if the token carries one
    pub email: Option<String>,

    /// Caller's role name, if the token carries one
    pub role: Option<String>,
}

impl AuthContext {
    /// Creates auth context from validated JWT claims
    pub fn from_claims(claims: Claims) -> Self {
        let is_admin = claims.is_admin();
        Self {
            user_id: claims.sub,
            is_admin,
            email: claims.email.filter(|e| !e.is_empty()),
            role: claims.role,
        }
    }
}

/// Error type for authentication middleware
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No token in header or cookie
    #[error("Missing credentials")]
    MissingCredentials,

    /// Authorization header present but malformed
    #[error("{0}")]
    InvalidFormat(String),

    /// Token validation failed
    #[error("{0}")]
    InvalidToken(String),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::InvalidToken("Token has expired".to_string()),
            _ => AuthError::InvalidToken(format!("Invalid token: {}", err)),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::InvalidFormat(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::UNAUTHORIZED,
        };

        let body = Json(serde_json::json!({
            "error": "Unauthorized",
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Finds the raw access token in the request headers
///
/// The cookie is only consulted when no `Authorization` header is present; a
/// malformed header is an error.
pub fn extract_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let value = value
            .to_str()
            .map_err(|_| AuthError::InvalidFormat("Invalid authorization header".to_string()))?;

        return value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()));
    }

    cookie_value(headers, ACCESS_TOKEN_COOKIE).ok_or(AuthError::MissingCredentials)
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
        .filter(|value| !value.is_empty())
}

/// Validates the request's access token and builds its `AuthContext`
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let token = extract_token(headers)?;
    let claims = validate_access_token(token, secret)?;
    Ok(AuthContext::from_claims(claims))
}
