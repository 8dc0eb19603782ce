//! Client-side ingredient lookup used by the favorites and avoid steps.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::catalog::{fallback_catalog, filter};
use super::model::IngredientRef;
use crate::error::ApiError;

/// Source of the remote ingredient catalog.
#[async_trait]
pub trait IngredientLookup: Send + Sync {
    /// Fetch the full catalog.
    async fn fetch_all(&self) -> Result<Vec<IngredientRef>, ApiError>;
}

/// Where the selector's catalog came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    Remote,
    Fallback,
}

/// Caches the catalog and filters it locally as the user types.
///
/// Starts out on the built-in catalog; [`IngredientSelector::load`] swaps in
/// the remote one when it is reachable and non-empty.
pub struct IngredientSelector {
    catalog: RwLock<(CatalogSource, Vec<IngredientRef>)>,
}

impl Default for IngredientSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl IngredientSelector {
    pub fn new() -> Self {
        Self {
            catalog: RwLock::new((CatalogSource::Fallback, fallback_catalog())),
        }
    }

    /// Fetch the remote catalog. Failures keep the fallback catalog in place.
    pub async fn load(&self, lookup: &dyn IngredientLookup) -> CatalogSource {
        match lookup.fetch_all().await {
            Ok(items) if !items.is_empty() => {
                debug!(count = items.len(), "Loaded remote ingredient catalog");
                *self.catalog.write().await = (CatalogSource::Remote, items);
                CatalogSource::Remote
            }
            Ok(_) => {
                warn!("Remote ingredient catalog is empty, using default ingredients");
                self.source().await
            }
            Err(e) => {
                warn!(error = %e, "Using default ingredients");
                self.source().await
            }
        }
    }

    pub async fn source(&self) -> CatalogSource {
        self.catalog.read().await.0
    }

    /// Multi-term search over the cached catalog.
    pub async fn search(&self, query: &str) -> Vec<IngredientRef> {
        let guard = self.catalog.read().await;
        filter(&guard.1, query)
    }

    /// Search results minus anything already selected.
    pub async fn available(&self, query: &str, selected: &[IngredientRef]) -> Vec<IngredientRef> {
        self.search(query)
            .await
            .into_iter()
            .filter(|i| !selected.iter().any(|s| s.id == i.id))
            .collect()
    }
}
