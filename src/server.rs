//! Backend HTTP server: router assembly and the serve loop.

use std::sync::Arc;
use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::Result;
use crate::ingredients::catalog::seed_catalog;
use crate::ingredients::ingredient_routes;
use crate::profile::profile_routes;
use crate::store::{Database, LibSqlBackend};

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "message": "Server is running" }))
}

/// GET /api
async fn welcome() -> Json<serde_json::Value> {
    Json(json!({ "message": "Welcome to Mindful Meals API" }))
}

/// CORS for the configured origins. Entries that aren't valid header values
/// are logged and skipped.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
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
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60))
}

/// Build the full application router over a database.
pub fn build_router(db: Arc<dyn Database>, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api", get(welcome))
        .merge(profile_routes(Arc::clone(&db)))
        .merge(ingredient_routes(db))
        .layer(ServiceBuilder::new().layer(cors_layer(cors_origins)))
}

/// Open the database, optionally seed the catalog, and serve until Ctrl+C.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let db: Arc<dyn Database> = Arc::new(LibSqlBackend::open(&config.database_url).await?);
    info!(database = %config.database_url, "Connected to database");

    if config.seed_catalog {
        let seeded = seed_catalog(db.as_ref(), false).await?;
        if seeded > 0 {
            info!(count = seeded, "Seeded empty ingredient catalog");
        }
    }

    let addr = config.socket_addr()?;
    let app = build_router(db, &config.cors_origins);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down");
}
