//! HTTP server initialization and runtime setup.
//!
//! Handles store and cache selection, service wiring, and Axum server lifecycle.

use crate::application::services::{ShortenerService, ShortenerSettings};
use crate::config::Config;
use crate::domain::repositories::UrlRepository;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::persistence::{MemoryUrlRepository, PgUrlRepository};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::code_generator::RandomCodeGenerator;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::fmt::Display;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - URL store: PostgreSQL (with migrations) or in-memory fallback
/// - Redis cache (or NullCache fallback)
/// - Shortener service
/// - Axum HTTP server with graceful shutdown on Ctrl+C / SIGTERM
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let repository = build_repository(&config).await?;
    let cache = build_cache(&config).await;
    let state = build_state(&config, repository, cache.clone());

    let app = app_router(state, &config)?;

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wires the shortener service and handler state from already-built backends.
pub fn build_state(
    config: &Config,
    repository: Arc<dyn UrlRepository>,
    cache: Arc<dyn CacheService>,
) -> AppState {
    let generator = Arc::new(RandomCodeGenerator::new(config.short_code_length));

    let shortener_service = Arc::new(ShortenerService::new(
        repository,
        generator,
        cache.clone(),
        ShortenerSettings {
            base_url: config.base_url.clone(),
            max_code_attempts: config.max_code_attempts,
            cache_ttl_seconds: Some(config.cache_ttl_seconds),
        },
    ));

    AppState::new(shortener_service, cache)
}

async fn build_repository(config: &Config) -> Result<Arc<dyn UrlRepository>> {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set, using in-memory store (data is lost on restart)");
        return Ok(Arc::new(MemoryUrlRepository::new()));
    };

    let pool = connect_pool(config, database_url).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Migrations applied");

    Ok(Arc::new(PgUrlRepository::new(Arc::new(pool))))
}

/// Connects to PostgreSQL, retrying with exponential backoff so the service
/// can start alongside its database.
pub async fn connect_pool(config: &Config, database_url: &str) -> Result<PgPool> {
    let options = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime));

    let strategy = ExponentialBackoff::from_millis(2)
        .factor(250)
        .max_delay(Duration::from_secs(10))
        .map(jitter)
        .take(5);

    Retry::start(strategy, || {
        let options = options.clone();
        async move {
            options.connect(database_url).await.inspect_err(|e| {
                tracing::warn!("Database connection attempt failed: {}", e);
            })
        }
    })
    .await
    .context("Failed to connect to database")
}

async fn build_cache(config: &Config) -> Arc<dyn CacheService> {
    if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        }
    } else {
        tracing::info!("Cache disabled (NullCache)");
        Arc::new(NullCache::new())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = wait_for_signal(
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()).map(
            |mut signal| async move {
                signal.recv().await;
            },
        ),
        "SIGTERM",
    );

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Waits for a registered signal. If registration failed, never resolves,
/// so the other shutdown triggers stay in charge.
async fn wait_for_signal<F, E>(registered: Result<F, E>, name: &str)
where
    F: Future<Output = ()>,
    E: Display,
{
    match registered {
        Ok(signal) => signal.await,
        Err(e) => {
            tracing::error!("Failed to listen for {}: {}", name, e);
            std::future::pending::<()>().await
        }
    }
}
