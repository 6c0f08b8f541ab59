/// Authorization checks
///
/// The admin backend has a single permission level: callers whose token carries
/// `is_admin = true` may use every admin endpoint, everyone else is refused.
///
/// The check is a pure function over the request's [`AuthContext`]; it performs no
/// I/O and keeps no state, so the HTTP layer can run it before any handler work.
///
/// # Example
///
/// ```
/// use violation_shared::auth::authorization::{require_admin, AuthzError};
/// use violation_shared::auth::middleware::AuthContext;
///
/// let auth = AuthContext {
///     user_id: "5".to_string(),
///     is_admin: false,
///     email: None,
///     role: None,
/// };
///
/// assert!(matches!(require_admin(&auth), Err(AuthzError::AdminRequired { .. })));
/// ```

use super::middleware::AuthContext;

/// Message returned to callers that fail the admin gate
pub const ADMIN_REQUIRED_MESSAGE: &str = "Admin privileges required";

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Caller is authenticated but lacks the admin flag
    #[error("Admin privileges required (user {user_id})")]
    AdminRequired { user_id: String },
}

/// Requires the caller to hold the admin flag
///
/// A context without the flag (including one built from a token that omitted the
/// claim) is rejected.
pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    if !auth.is_admin {
        return Err(AuthzError::AdminRequired {
            user_id: auth.user_id.clone(),
        });
    }

    Ok(())
}
