use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::types::Resolution;

struct CacheEntry {
    resolution: Resolution,
    inserted_at: Instant,
}

/// Bounded in-memory cache of successful `doc://` resolutions, keyed by the
/// full canonical URI string.
///
/// Owned by one resolver instance rather than living as ambient shared
/// state. Eviction is FIFO by insertion once `capacity` is reached, plus an
/// optional TTL. Entries are otherwise invalidated only by [`clear`].
/// Concurrent callers racing to populate one key are benign: resolutions
/// for equal keys are always equal.
///
/// [`clear`]: ResolutionCache::clear
pub struct ResolutionCache {
    capacity: usize,
    ttl: Option<Duration>,
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, CacheEntry>,
    order: VecDeque<String>,
}

impl ResolutionCache {
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        Self {
            capacity: capacity.max(1),
            ttl,
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Look up a resolution. Expired entries read as misses and are purged
    /// on the next insert.
    pub fn get(&self, key: &str) -> Option<Resolution> {
        let inner = self.inner.read().expect("lock poisoned");
        let entry = inner.entries.get(key)?;
        if let Some(ttl) = self.ttl {
            if entry.inserted_at.elapsed() > ttl {
                return None;
            }
        }
        Some(entry.resolution.clone())
    }

    /// Insert a resolution, evicting the oldest entries past capacity.
    pub fn insert(&self, key: impl Into<String>, resolution: Resolution) {
        let key = key.into();
        let mut inner = self.inner.write().expect("lock poisoned");
        if let Some(ttl) = self.ttl {
            let expired: Vec<String> = inner
                .entries
                .iter()
                .filter(|(_, e)| e.inserted_at.elapsed() > ttl)
                .map(|(k, _)| k.clone())
                .collect();
            for k in expired {
                inner.entries.remove(&k);
                inner.order.retain(|o| o != &k);
            }
        }
        if !inner.entries.contains_key(&key) {
            inner.order.push_back(key.clone());
        }
        inner.entries.insert(
            key,
            CacheEntry {
                resolution,
                inserted_at: Instant::now(),
            },
        );
        while inner.entries.len() > self.capacity {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.inner.read().expect("lock poisoned").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry. The only invalidation besides capacity/TTL.
    pub fn clear(&self) {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner.entries.clear();
        inner.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_types::ContentMetadata;

    fn resolution(tag: &str) -> Resolution {
        Resolution {
            content: tag.as_bytes().to_vec(),
            metadata: ContentMetadata::with_size(tag.len() as u64),
            resolved: true,
            canonical: true,
            from_cache: false,
        }
    }

    #[test]
    fn hit_and_miss() {
        let cache = ResolutionCache::new(4, None);
        cache.insert("doc://a", resolution("a"));
        assert_eq!(cache.get("doc://a").unwrap().content, b"a");
        assert!(cache.get("doc://b").is_none());
    }

    #[test]
    fn capacity_evicts_oldest_first() {
        let cache = ResolutionCache::new(2, None);
        cache.insert("k1", resolution("1"));
        cache.insert("k2", resolution("2"));
        cache.insert("k3", resolution("3"));
        assert_eq!(cache.len(), 2);
        assert!(cache.get("k1").is_none());
        assert!(cache.get("k2").is_some());
        assert!(cache.get("k3").is_some());
    }

    #[test]
    fn ttl_expires_entries() {
        let cache = ResolutionCache::new(4, Some(Duration::from_millis(0)));
        cache.insert("k", resolution("x"));
        std::thread::sleep(Duration::from_millis(2));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn clear_drops_everything() {
        let cache = ResolutionCache::new(4, None);
        cache.insert("k1", resolution("1"));
        cache.insert("k2", resolution("2"));
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("k1").is_none());
    }

    #[test]
    fn reinsert_same_key_keeps_single_entry() {
        let cache = ResolutionCache::new(2, None);
        cache.insert("k", resolution("old"));
        cache.insert("k", resolution("new"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k").unwrap().content, b"new");
    }
}
