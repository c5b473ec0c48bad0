//! Resource cache for cluster listings
//!
//! Listings are memoized per (kind, scope) until the next invalidation. There is no TTL:
//! entries are dropped wholesale when the cluster context file changes or a command
//! mutates cluster state, and the next read fetches again.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tekton_cli::Tkn;
use tekton_shared::{CacheConfig, ResourceDescriptor, ResourceKind, Result, Scope};
use tracing::{debug, trace};

/// Cache key: what was listed and how it was narrowed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: ResourceKind,
    pub scope: Scope,
}

impl CacheKey {
    pub fn new(kind: ResourceKind, scope: Scope) -> Self {
        Self { kind, scope }
    }
}

/// Cache statistics for monitoring
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub fetches: u64,
    pub invalidations: u64,
    /// Fetches that finished after an invalidation and were not stored
    pub discarded: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            self.hits as f64 / (self.hits + self.misses) as f64
        }
    }
}

pub struct ResourceCache {
    tkn: Arc<dyn Tkn>,
    enabled: bool,
    entries: RwLock<HashMap<CacheKey, Arc<Vec<ResourceDescriptor>>>>,
    /// Bumped by every invalidation
    epoch: AtomicU64,
    stats: Mutex<CacheStats>,
}

impl ResourceCache {
    pub fn new(tkn: Arc<dyn Tkn>, config: &CacheConfig) -> Self {
        Self {
            tkn,
            enabled: config.enabled,
            entries: RwLock::new(HashMap::new()),
            epoch: AtomicU64::new(0),
            stats: Mutex::new(CacheStats::default()),
        }
    }

    /// Cached listing for `kind` in `scope`, fetching it from the cluster on a miss.
    ///
    /// Failed fetches are not cached.
    pub async fn get(&self, kind: ResourceKind, scope: &Scope) -> Result<Vec<ResourceDescriptor>> {
        let key = CacheKey::new(kind, scope.clone());

        if self.enabled {
            if let Some(hit) = self.entries.read().get(&key).cloned() {
                self.stats.lock().hits += 1;
                trace!("Cache hit for {} in scope {}", kind, scope);
                return Ok(hit.as_ref().clone());
            }
            self.stats.lock().misses += 1;
            trace!("Cache miss for {} in scope {}", kind, scope);
        }

        let epoch = self.epoch.load(Ordering::SeqCst);
        let fetched = self.tkn.list(kind, scope).await?;
        self.stats.lock().fetches += 1;

        if self.enabled {
            let mut entries = self.entries.write();
            // An invalidation raced with this fetch; the result may predate it.
            if self.epoch.load(Ordering::SeqCst) == epoch {
                entries.insert(key, Arc::new(fetched.clone()));
            } else {
                self.stats.lock().discarded += 1;
                debug!("Discarding {} listing fetched before invalidation", kind);
            }
        }

        Ok(fetched)
    }

    /// Drop every cached listing
    pub fn invalidate_all(&self) {
        let mut entries = self.entries.write();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let dropped = entries.len();
        entries.clear();
        drop(entries);

        self.stats.lock().invalidations += 1;
        debug!("Resource cache invalidated ({} entries dropped)", dropped);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.lock().clone()
    }
}
