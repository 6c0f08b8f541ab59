/// Health check endpoint
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected",
///   "cache": "connected"
/// }
/// ```
///
/// `status` is `degraded` when either the database or the field cache backend
/// does not answer, and the failing dependency reads `disconnected`; the endpoint
/// itself still returns 200.

use crate::app::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use violation_shared::db::pool::health_check as database_health_check;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Application version
    pub version: String,

    /// Database status
    pub database: String,

    /// Field cache backend status
    pub cache: String,
}

fn connection_label(connected: bool) -> String {
    if connected { "connected" } else { "disconnected" }.to_string()
}

impl HealthResponse {
    fn from_checks(database: bool, cache: bool) -> Self {
        let status = if database && cache { "healthy" } else { "degraded" };

        Self {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: connection_label(database),
            cache: connection_label(cache),
        }
    }
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match database_health_check(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            false
        }
    };

    let cache = match state.field_cache.health().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Cache health check failed");
            false
        }
    };

    Json(HealthResponse::from_checks(database, cache))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_states() {
        let healthy = HealthResponse::from_checks(true, true);
        assert_eq!(healthy.status, "healthy");
        assert_eq!(healthy.database, "connected");
        assert_eq!(healthy.cache, "connected");
        assert_eq!(healthy.version, env!("CARGO_PKG_VERSION"));

        let degraded = HealthResponse::from_checks(false, true);
        assert_eq!(degraded.status, "degraded");
        assert_eq!(degraded.database, "disconnected");
        assert_eq!(degraded.cache, "connected");

        let cache_down = HealthResponse::from_checks(true, false);
        assert_eq!(cache_down.status, "degraded");
        assert_eq!(cache_down.cache, "disconnected");
    }
}
