//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, provider selection, enrichment worker
//! spawning, and Axum server lifecycle.

use crate::application::enrichment::{EnrichmentWorker, WorkerSettings};
use crate::application::services::{LookupService, SightingService};
use crate::config::Config;
use crate::domain::repositories::PhotoCacheRepository;
use crate::infrastructure::persistence::{
    PgPhotoCacheRepository, PgRateBudgetRepository, PgSightingRepository,
};
use crate::infrastructure::providers::{ImageProvider, UnsplashProvider, WikipediaProvider};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Image provider (Wikipedia or Unsplash, per `PHOTO_PROVIDER`)
/// - Background enrichment worker
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Database connection fails
/// - Migrations fail to apply
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to migrate")?;

    let pool_arc = Arc::new(pool);
    let photo_cache: Arc<dyn PhotoCacheRepository> =
        Arc::new(PgPhotoCacheRepository::new(pool_arc.clone()));
    let sighting_repository = Arc::new(PgSightingRepository::new(pool_arc.clone()));

    let provider = build_provider(&config, pool_arc.clone())?;
    tracing::info!("Image provider: {}", provider.name());

    let worker = Arc::new(EnrichmentWorker::new(
        photo_cache.clone(),
        provider,
        WorkerSettings {
            batch_size: config.worker_batch_size,
            request_delay: Duration::from_millis(config.worker_request_delay_ms),
        },
    ));
    tokio::spawn(EnrichmentWorker::run(
        worker,
        Duration::from_secs(config.worker_interval_secs),
    ));
    tracing::info!(
        "Enrichment worker started (every {}s)",
        config.worker_interval_secs
    );

    let state = AppState::new(
        Arc::new(LookupService::new(photo_cache.clone())),
        Arc::new(SightingService::new(sighting_repository)),
        photo_cache,
    );

    let app = app_router(state, config.behind_proxy);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

/// Resolves on SIGINT or SIGTERM. In-flight requests finish; the worker's
/// per-entry commits make its interruption safe.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Selects the image provider named by `PHOTO_PROVIDER`.
///
/// Unknown names are rejected by [`Config::validate`] before this runs.
fn build_provider(
    config: &Config,
    pool: Arc<sqlx::PgPool>,
) -> Result<Arc<dyn ImageProvider>> {
    match config.photo_provider.as_str() {
        "unsplash" => {
            let access_key = config
                .unsplash_access_key
                .clone()
                .context("UNSPLASH_ACCESS_KEY must be set when PHOTO_PROVIDER=unsplash")?;
            let budget = Arc::new(PgRateBudgetRepository::new(pool));
            Ok(Arc::new(UnsplashProvider::new(
                access_key,
                budget,
                config.unsplash_rate_limit,
                chrono::Duration::seconds(config.unsplash_rate_window_secs),
                config.placeholder_image_url.clone(),
            )))
        }
        _ => Ok(Arc::new(WikipediaProvider::new(
            config.wikipedia_api_base.clone(),
            config.provider_user_agent.clone(),
        ))),
    }
}
