//! # Violation Tracker Admin API Server
//!
//! Serves field definition management for the violation report form and the
//! SMTP diagnostics used by the admin settings page.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p violation-api
//! ```

use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use violation_api::{
    app::{build_router, AppState},
    config::Config,
};
use violation_shared::{
    cache::{memory::MemoryFieldCache, redis::RedisFieldCache, FieldCache},
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    mail::SmtpMailer,
    redis::{RedisClient, RedisConfig},
};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "violation_api=debug,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn build_field_cache(config: &Config) -> anyhow::Result<Arc<dyn FieldCache>> {
    match &config.cache.redis_url {
        Some(url) => {
            let client = RedisClient::new(RedisConfig::new(url.clone())).await?;
            tracing::info!(ttl_secs = config.cache.ttl_secs, "Using Redis field cache");
            Ok(Arc::new(RedisFieldCache::new(
                client,
                Duration::from_secs(config.cache.ttl_secs),
            )))
        }
        None => {
            tracing::info!("REDIS_URL not set, using in-process field cache");
            Ok(Arc::new(MemoryFieldCache::new()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the log filter is read
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!(
        "Violation Tracker API v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;
    run_migrations(&pool).await?;

    let field_cache = build_field_cache(&config).await?;

    let missing = config.mail.missing_essentials();
    if !missing.is_empty() {
        tracing::warn!(?missing, "SMTP is not fully configured; email sending will fail");
    }
    let mailer = Arc::new(SmtpMailer::new(config.mail.clone()));

    let bind_address = config.bind_address();
    let state = AppState::new(pool.clone(), config, field_cache, mailer);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    Ok(())
}
