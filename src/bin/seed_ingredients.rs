//! Replace the ingredient catalog with the built-in seed records.
//!
//! Reads `MEALS_DATABASE_URL` like the server does.

use anyhow::Context;

use mindful_meals::config::ServerConfig;
use mindful_meals::ingredients::catalog::seed_catalog;
use mindful_meals::store::LibSqlBackend;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServerConfig::from_env().context("Failed to load configuration")?;
    let db = LibSqlBackend::open(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database at {}", config.database_url))?;

    let count = seed_catalog(&db, true)
        .await
        .context("Failed to seed ingredients")?;

    tracing::info!(count, database = %config.database_url, "Ingredient catalog seeded");
    Ok(())
}
