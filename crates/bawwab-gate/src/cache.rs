//! Known-good credential cache

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

/// Cache of credential strings that recently authenticated successfully.
///
/// Keyed by the entire raw Authorization value, so a password change
/// invalidates the entry implicitly. Entries carry no payload; presence
/// within the TTL window is the whole answer. Failures are never cached.
///
/// Safe for concurrent lookup/store from any number of verifications.
pub struct ResultCache {
    ttl: Option<Duration>,
    entries: RwLock<HashMap<String, Instant>>,
}

impl ResultCache {
    /// TTL in whole seconds; zero or negative disables the cache.
    pub fn new(ttl_secs: i64) -> Self {
        let ttl = (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs as u64));
        Self::with_ttl(ttl)
    }

    pub fn with_ttl(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn enabled(&self) -> bool {
        self.ttl.is_some()
    }

    /// True when `key` authenticated successfully within the TTL window.
    pub async fn lookup(&self, key: &str) -> bool {
        let Some(ttl) = self.ttl else { return false };

        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(stored) => stored.elapsed() < ttl,
            None => false,
        }
    }

    /// Record a successful authentication. No-op when the cache is disabled.
    ///
    /// Expired entries are pruned here, keeping the map bounded by the set
    /// of credentials seen within one TTL window.
    pub async fn store(&self, key: &str) {
        let Some(ttl) = self.ttl else { return };

        let mut entries = self.entries.write().await;
        let now = Instant::now();
        entries.retain(|_, stored| now.duration_since(*stored) < ttl);
        entries.insert(key.to_string(), now);

        debug!(cached = entries.len(), "stored verification result");
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_cache_never_hits() {
        let cache = ResultCache::new(0);
        assert!(!cache.enabled());

        cache.store("Basic abc").await;
        assert!(!cache.lookup("Basic abc").await);
        assert_eq!(cache.len().await, 0);

        let cache = ResultCache::new(-5);
        assert!(!cache.enabled());
    }

    #[tokio::test]
    async fn hit_within_ttl_window() {
        let cache = ResultCache::new(30);

        assert!(!cache.lookup("Basic abc").await);
        cache.store("Basic abc").await;
        assert!(cache.lookup("Basic abc").await);
        assert!(!cache.lookup("Basic other").await);
    }

    #[tokio::test]
    async fn entry_expires_after_ttl() {
        let cache = ResultCache::with_ttl(Some(Duration::from_millis(40)));

        cache.store("Basic abc").await;
        assert!(cache.lookup("Basic abc").await);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!cache.lookup("Basic abc").await);
    }

    #[tokio::test]
    async fn store_prunes_expired_entries() {
        let cache = ResultCache::with_ttl(Some(Duration::from_millis(40)));

        cache.store("Basic old").await;
        tokio::time::sleep(Duration::from_millis(60)).await;

        cache.store("Basic new").await;
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn clear_empties_the_cache() {
        let cache = ResultCache::new(30);

        cache.store("Basic abc").await;
        cache.clear().await;
        assert!(!cache.lookup("Basic abc").await);
    }
}
