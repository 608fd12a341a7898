//! Response cache for GET requests.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

struct CacheEntry {
    body: String,
    expires_at: Instant,
}

/// TTL-bounded cache of raw response bodies keyed by request path and query
/// (for example `/posts?page=2&limit=10`).
pub struct QueryCache {
    ttl: Duration,
    store: RwLock<HashMap<String, CacheEntry>>,
}

impl QueryCache {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            store: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let store = self.store.read().await;
        let entry = store.get(key)?;

        if Instant::now() >= entry.expires_at {
            drop(store);
            self.store.write().await.remove(key);
            return None;
        }

        Some(entry.body.clone())
    }

    pub async fn insert(&self, key: impl Into<String>, body: impl Into<String>) {
        let entry = CacheEntry {
            body: body.into(),
            expires_at: Instant::now() + self.ttl,
        };
        self.store.write().await.insert(key.into(), entry);
    }

    /// Drop every entry whose key starts with `prefix`.
    pub async fn invalidate_prefix(&self, prefix: &str) {
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|key, _| !key.starts_with(prefix));
        tracing::trace!(prefix, dropped = before - store.len(), "Invalidated cached queries");
    }

    pub async fn clear(&self) {
        self.store.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}
