//! Cached wrapper around instance discovery
//!
//! Serves the instance list from the cache store while it is fresh and
//! refetches the whole inventory otherwise.

use std::sync::Arc;

use crate::cache::{CacheStore, ProfileKey};
use crate::client::{InstanceDiscovery, InstanceRecord};
use crate::error::Result;

/// Cached instance inventory for any `InstanceDiscovery` implementation.
///
/// Reading the cache can be disabled via `use_cache` (for `--no-cache`);
/// a refreshed list is always written back.
pub struct CachedInventory<D: InstanceDiscovery> {
    inner: Arc<D>,
    store: CacheStore,
    engine: String,
    use_cache: bool,
}

impl<D: InstanceDiscovery> CachedInventory<D> {
    /// # Arguments
    /// * `inner` - Discovery collaborator used on cache miss
    /// * `store` - Cache store owning the files
    /// * `engine` - Engine family to keep; everything else is dropped
    /// * `use_cache` - Whether cached lists may be served
    pub fn new(inner: Arc<D>, store: CacheStore, engine: &str, use_cache: bool) -> Self {
        Self {
            inner,
            store,
            engine: engine.to_string(),
            use_cache,
        }
    }

    /// Instance list for a profile and region, from cache or a refresh
    pub async fn instances(&self, key: &ProfileKey) -> Result<Vec<InstanceRecord>> {
        if let Some(cached) = self.cached(key) {
            return Ok(cached);
        }
        self.refresh(key).await
    }

    /// Fresh cached list, if allowed and present
    pub fn cached(&self, key: &ProfileKey) -> Option<Vec<InstanceRecord>> {
        if !self.use_cache {
            return None;
        }
        let cached = self.store.load(key)?;
        log::debug!(
            "Cache hit: {} instances for {}:{}",
            cached.len(),
            key.profile,
            key.region
        );
        Some(cached)
    }

    /// Fetch the full inventory, keep the configured engine, persist it
    pub async fn refresh(&self, key: &ProfileKey) -> Result<Vec<InstanceRecord>> {
        log::debug!("Refreshing instances for {}:{}", key.profile, key.region);

        let records: Vec<InstanceRecord> = self
            .inner
            .list_instances()
            .await?
            .into_iter()
            .filter(|i| i.engine == self.engine)
            .map(|i| i.record)
            .collect();

        if let Err(e) = self.store.save(key, &records) {
            log::warn!("Could not write instance cache: {}", e);
        }

        Ok(records)
    }
}
