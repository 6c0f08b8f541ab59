/// Authentication and authorization utilities
///
/// This module provides the request-level security primitives for the admin backend:
///
/// # Modules
///
/// - [`jwt`]: JWT claim set, token creation and validation
/// - [`middleware`]: Credential extraction (Bearer header or cookie) and `AuthContext`
/// - [`authorization`]: The stateless admin gate
///
/// # Example
///
/// ```
/// use violation_shared::auth::authorization::require_admin;
/// use violation_shared::auth::jwt::{create_token, validate_access_token, Claims, TokenType};
/// use violation_shared::auth::middleware::AuthContext;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "your-secret-key-at-least-32-bytes-long";
/// let claims = Claims::new("42", TokenType::Access).with_admin(true);
/// let token = create_token(&claims, secret)?;
///
/// let validated = validate_access_token(&token, secret)?;
/// let auth = AuthContext::from_claims(validated);
/// require_admin(&auth)?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
