/// JWT token generation and validation module
///
/// Tokens are issued by the login flow of the main application and carry the
/// caller's identity plus the role flags the admin backend needs. This module
/// validates them and exposes the decoded claim set.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: 30 minutes for access tokens, 7 days for refresh tokens
/// - **Validation**: Signature, expiration and not-before checks
/// - **Secret Management**: Secrets should be at least 32 bytes (256 bits)
///
/// # Claim Set
///
/// - `sub`: User identity (stringified user ID)
/// - `type`: `access` or `refresh`
/// - `is_admin`: Admin flag; absent or `null` reads as `false`, and numeric
///   `0`/`1` are accepted alongside booleans
/// - `email`: Caller's email address, when known
/// - `role`: Free-form role name, when known
///
/// # Example
///
/// ```
/// use violation_shared::auth::jwt::{create_token, validate_token, Claims, TokenType};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new("7", TokenType::Access)
///     .with_admin(true)
///     .with_email("admin@example.com");
/// let token = create_token(&claims, "your-secret-key")?;
///
/// let validated = validate_token(&token, "your-secret-key")?;
/// assert_eq!(validated.sub, "7");
/// assert!(validated.is_admin());
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Deserializer, Serialize};

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token used before its nbf time
    #[error("Token is not yet valid")]
    Immature,
}

/// Token type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Access token (short-lived, 30 minutes)
    Access,

    /// Refresh token (long-lived, 7 days)
    Refresh,
}

impl TokenType {
    /// Gets default expiration duration for token type
    pub fn default_expiration(&self) -> Duration {
        match self {
            TokenType::Access => Duration::minutes(30),
            TokenType::Refresh => Duration::days(7),
        }
    }

    /// Gets token type as string
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

fn default_token_type() -> TokenType {
    TokenType::Access
}

/// Admin flag as issuers encode it
#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
    Float(f64),
}

/// Reads a boolean claim that may also arrive as a number (nonzero is true)
fn truthy_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Flag>::deserialize(deserializer)?.map(|flag| match flag {
        Flag::Bool(value) => value,
        Flag::Int(value) => value != 0,
        Flag::Float(value) => value != 0.0,
    }))
}

/// JWT claims structure
///
/// Only `sub`, `iat` and `exp` are mandatory on the wire. Role claims are optional
/// so that tokens minted for non-admin users (which may omit `is_admin`) still decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user identity
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    #[serde(default)]
    pub nbf: i64,

    /// Token type
    #[serde(rename = "type", default = "default_token_type")]
    pub token_type: TokenType,

    /// Admin flag
    #[serde(
        default,
        deserialize_with = "truthy_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_admin: Option<bool>,

    /// Email address of the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Role name of the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Claims {
    /// Creates new claims with default expiration and no role claims
    pub fn new(sub: impl Into<String>, token_type: TokenType) -> Self {
        Self::with_expiration(sub, token_type, token_type.default_expiration())
    }

    /// Creates claims with custom expiration
    ///
    /// # Example
    ///
    /// ```
    /// use violation_shared::auth::jwt::{Claims, TokenType};
    /// use chrono::Duration;
    ///
    /// let claims = Claims::with_expiration("1", TokenType::Access, Duration::hours(1));
    /// assert!(!claims.is_expired());
    /// ```
    pub fn with_expiration(
        sub: impl Into<String>,
        token_type: TokenType,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: sub.into(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            token_type,
            is_admin: None,
            email: None,
            role: None,
        }
    }

    /// Sets the admin claim
    pub fn with_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = Some(is_admin);
        self
    }

    /// Sets the email claim
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the role claim
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Whether the admin claim is present and true
    pub fn is_admin(&self) -> bool {
        self.is_admin.unwrap_or(false)
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Creates a JWT token from claims
///
/// Signs the token using HS256 (HMAC-SHA256) with the provided secret.
///
/// # Errors
///
/// Returns `JwtError::CreateError` if token creation fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT token and extracts claims
///
/// Verifies:
/// - Signature is valid
/// - Token hasn't expired
/// - Token is not used before nbf time
///
/// # Errors
///
/// Returns `JwtError::Expired` for expired tokens and `JwtError::ValidationError`
/// for anything else that fails to verify or decode.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::ImmatureSignature => JwtError::Immature,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Validates token and checks it's an access token
///
/// # Example
///
/// ```
/// use violation_shared::auth::jwt::{create_token, validate_access_token, Claims, TokenType};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let token = create_token(&Claims::new("1", TokenType::Refresh), "secret")?;
/// assert!(validate_access_token(&token, "secret").is_err());
/// # Ok(())
/// # }
/// ```
pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;

    if claims.token_type != TokenType::Access {
        return Err(JwtError::ValidationError(
            "Expected access token, got refresh token".to_string(),
        ));
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_token_type_expiration() {
        assert_eq!(TokenType::Access.default_expiration(), Duration::minutes(30));
        assert_eq!(TokenType::Refresh.default_expiration(), Duration::days(7));
        assert_eq!(TokenType::Refresh.as_str(), "refresh");
    }

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new("12", TokenType::Access);

        assert_eq!(claims.sub, "12");
        assert_eq!(claims.token_type, TokenType::Access);
        assert!(claims.is_admin.is_none());
        assert!(!claims.is_admin());
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_builder_sets_role_claims() {
        let claims = Claims::new("3", TokenType::Access)
            .with_admin(true)
            .with_email("admin@example.com")
            .with_role("council");

        assert!(claims.is_admin());
        assert_eq!(claims.email.as_deref(), Some("admin@example.com"));
        assert_eq!(claims.role.as_deref(), Some("council"));
    }

    #[test]
    fn test_create_and_validate_token() {
        let claims = Claims::new("5", TokenType::Access)
            .with_admin(true)
            .with_email("a@example.com");
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, "5");
        assert!(validated.is_admin());
        assert_eq!(validated.email.as_deref(), Some("a@example.com"));
        assert_eq!(validated.token_type, TokenType::Access);
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let token = create_token(&Claims::new("1", TokenType::Access), "secret1").unwrap();

        let result = validate_token(&token, "wrong-secret");
        assert!(matches!(result, Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_validate_expired_token() {
        let claims = Claims::with_expiration("1", TokenType::Access, Duration::seconds(-3600));

        assert!(claims.is_expired());

        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_validate_access_token_rejects_refresh() {
        let access = create_token(&Claims::new("1", TokenType::Access), SECRET).unwrap();
        assert!(validate_access_token(&access, SECRET).is_ok());

        let refresh = create_token(&Claims::new("1", TokenType::Refresh), SECRET).unwrap();
        assert!(validate_access_token(&refresh, SECRET).is_err());
    }

    #[test]
    fn test_null_and_missing_admin_claim_decode_as_false() {
        let now = Utc::now().timestamp();
        let raw = serde_json::json!({
            "sub": "9",
            "iat": now,
            "exp": now + 600,
            "is_admin": null
        });
        let claims: Claims = serde_json::from_value(raw).unwrap();
        assert!(!claims.is_admin());
        assert_eq!(claims.token_type, TokenType::Access);

        let raw = serde_json::json!({ "sub": "9", "iat": now, "exp": now + 600 });
        let claims: Claims = serde_json::from_value(raw).unwrap();
        assert!(!claims.is_admin());
    }

    #[test]
    fn test_numeric_admin_claim_is_truthy() {
        let now = Utc::now().timestamp();
        let claims_with = |flag: serde_json::Value| {
            serde_json::json!({ "sub": "9", "iat": now, "exp": now + 600, "is_admin": flag })
        };

        let header = Header::new(Algorithm::HS256);
        let key = EncodingKey::from_secret(SECRET.as_bytes());

        let token = encode(&header, &claims_with(serde_json::json!(1)), &key).unwrap();
        assert!(validate_access_token(&token, SECRET).unwrap().is_admin());

        let token = encode(&header, &claims_with(serde_json::json!(0)), &key).unwrap();
        assert!(!validate_access_token(&token, SECRET).unwrap().is_admin());

        let claims: Claims = serde_json::from_value(claims_with(serde_json::json!(true))).unwrap();
        assert!(claims.is_admin());

        // Strings are not flags
        assert!(serde_json::from_value::<Claims>(claims_with(serde_json::json!("yes"))).is_err());
    }
}
