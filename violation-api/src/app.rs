/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use violation_api::{app::AppState, config::Config};
/// use violation_shared::cache::memory::MemoryFieldCache;
/// use violation_shared::mail::SmtpMailer;
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let mailer = SmtpMailer::new(config.mail.clone());
///
/// let state = AppState::new(pool, config, Arc::new(MemoryFieldCache::new()), Arc::new(mailer));
/// let app = violation_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self as axum_middleware, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};
use violation_shared::{
    auth::{authorization::require_admin, middleware::authenticate, middleware::AuthContext},
    cache::FieldCache,
    mail::Mailer,
};

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Cache of active field definitions
    pub field_cache: Arc<dyn FieldCache>,

    /// Outgoing mail transport
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Creates new application state
    pub fn new(
        db: PgPool,
        config: Config,
        field_cache: Arc<dyn FieldCache>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            db,
            config: Arc::new(config),
            field_cache,
            mailer,
        }
    }

    /// Gets JWT secret for token validation
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Routes
///
/// ```text
/// /health                                 public
/// /api/fields/active            GET       authenticated
/// /api/fields                   GET POST  admin
/// /api/fields/reorder           POST      admin
/// /api/fields/:id               PUT DELETE admin
/// /api/fields/:id/toggle        POST      admin
/// /api/admin/settings/test-email POST     admin
/// ```
///
/// # Middleware Stack
///
/// Outermost first: security headers, CORS, request tracing, then per-group
/// authentication and the admin gate.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Readable by any signed-in user
    let user_routes = Router::new()
        .route("/api/fields/active", get(routes::fields::list_active_fields))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Admin only; authentication runs first, then the gate
    let admin_routes = Router::new()
        .route(
            "/api/fields",
            get(routes::fields::list_fields).post(routes::fields::create_field),
        )
        .route("/api/fields/reorder", post(routes::fields::reorder_fields))
        .route(
            "/api/fields/:id",
            put(routes::fields::update_field).delete(routes::fields::delete_field),
        )
        .route("/api/fields/:id/toggle", post(routes::fields::toggle_field))
        .route(
            "/api/admin/settings/test-email",
            post(routes::settings::send_test_email),
        )
        .layer(axum_middleware::from_fn(admin_gate_layer))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let cors = cors_layer(&state.config);

    Router::new()
        .merge(health_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// JWT authentication middleware layer
///
/// Validates the access token from the `Authorization` header or the access
/// token cookie, then injects `AuthContext` into request extensions.
async fn jwt_auth_layer(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    match authenticate(req.headers(), state.jwt_secret()) {
        Ok(auth_context) => {
            req.extensions_mut().insert(auth_context);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "Rejected unauthenticated request");
            e.into_response()
        }
    }
}

/// Admin gate
///
/// Must run after `jwt_auth_layer`. Rejected requests never reach the handler.
async fn admin_gate_layer(req: Request, next: Next) -> Result<Response, ApiError> {
    let auth = req
        .extensions()
        .get::<AuthContext>()
        .ok_or_else(|| ApiError::Unauthorized("Missing credentials".to_string()))?;

    if let Err(e) = require_admin(auth) {
        warn!(user_id = %auth.user_id, path = %req.uri().path(), "Admin privileges required");
        return Err(e.into());
    }

    Ok(next.run(req).await)
}
