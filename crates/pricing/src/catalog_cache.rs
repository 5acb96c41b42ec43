//! Time-boxed read-through cache over the external catalog store.
//!
//! Catalog records are owned by the external store; this engine holds
//! read-only cached copies for a bounded lifetime so a burst of checkout and
//! report traffic doesn't hammer the store. Negative results are cached too:
//! an unknown SKU stays unknown for the TTL.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use tidewater_core::stores::{CatalogStore, StoreError};
use tidewater_core::types::{CatalogEntry, Sku};

/// Default snapshot lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

const MAX_ENTRIES: u64 = 10_000;

/// A caching [`CatalogStore`] decorator.
///
/// Cheaply cloneable; clones share the same cache.
#[derive(Clone)]
pub struct CachedCatalog {
    store: Arc<dyn CatalogStore>,
    cache: Cache<Sku, Option<CatalogEntry>>,
}

impl CachedCatalog {
    /// Wrap `store` with the default 5-minute TTL.
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self::with_ttl(store, DEFAULT_TTL)
    }

    /// Wrap `store` with an explicit TTL.
    #[must_use]
    pub fn with_ttl(store: Arc<dyn CatalogStore>, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_ENTRIES)
            .time_to_live(ttl)
            .build();
        Self { store, cache }
    }

    /// Drop every cached entry.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

#[async_trait]
impl CatalogStore for CachedCatalog {
    async fn entry(&self, sku: &Sku) -> Result<Option<CatalogEntry>, StoreError> {
        self.cache
            .try_get_with(sku.clone(), async {
                debug!(%sku, "catalog cache miss");
                self.store.entry(sku).await
            })
            .await
            // moka wraps the loader error in an Arc; surface it as a store
            // failure rather than unwrapping a shared error we can't move.
            .map_err(|err: Arc<StoreError>| StoreError::Unavailable(err.to_string()))
    }
}
