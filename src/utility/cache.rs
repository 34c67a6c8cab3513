// Standard library
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

// 3rd party crates
use tokio::sync::RwLock;
use tracing::{debug, warn};

// Project imports
use crate::providers::powerdns::models::ZoneInfo;

#[derive(Clone, Debug)]
pub struct CachedZone {
    pub zone: ZoneInfo,
    pub size: usize,
    pub timestamp: Instant,
}

/// Zone documents keyed by zone name, kept for `ttl` and bounded to
/// `capacity` bytes of serialized payload.
///
/// Entries that do not fit are simply not stored; live entries are never
/// evicted to make room.
pub struct ZoneCache {
    zones: HashMap<String, CachedZone>,
    ttl: Duration,
    capacity: usize,
    current_size: usize,
}

impl ZoneCache {
    pub fn new(capacity: usize, ttl_seconds: u64) -> Self {
        Self {
            zones: HashMap::new(),
            ttl: Duration::from_secs(ttl_seconds),
            capacity,
            current_size: 0,
        }
    }

    fn calculate_entry_size(key: &str, zone: &ZoneInfo) -> usize {
        // Serialized length is what PowerDNS sent us, close enough for a budget.
        key.len() + serde_json::to_vec(zone).map(|v| v.len()).unwrap_or(0)
    }

    pub fn get(&self, zone: &str) -> Option<ZoneInfo> {
        self.zones.get(zone).and_then(|entry| {
            if entry.timestamp.elapsed() < self.ttl {
                Some(entry.zone.clone())
            } else {
                None
            }
        })
    }

    /// Stores a zone document. Returns `false` when it does not fit.
    pub fn insert(&mut self, name: String, zone: ZoneInfo) -> bool {
        let entry_size = Self::calculate_entry_size(&name, &zone);

        // Replacing an entry frees its old size first
        if let Some(old) = self.zones.remove(&name) {
            self.current_size -= old.size;
        }

        if self.current_size + entry_size > self.capacity {
            self.purge_expired();
        }

        if self.current_size + entry_size > self.capacity {
            warn!(
                zone = %name,
                size = entry_size,
                "Zone does not fit in the request cache, not caching"
            );
            return false;
        }

        self.zones.insert(
            name,
            CachedZone {
                zone,
                size: entry_size,
                timestamp: Instant::now(),
            },
        );
        self.current_size += entry_size;
        true
    }

    pub fn invalidate(&mut self, zone: &str) {
        if let Some(entry) = self.zones.remove(zone) {
            self.current_size -= entry.size;
            debug!("Cache entry invalidated for zone: {}", zone);
        }
    }

    fn purge_expired(&mut self) {
        let ttl = self.ttl;
        let before = self.zones.len();
        let mut freed = 0;
        self.zones.retain(|_, entry| {
            let keep = entry.timestamp.elapsed() < ttl;
            if !keep {
                freed += entry.size;
            }
            keep
        });
        self.current_size -= freed;

        let removed = before - self.zones.len();
        if removed > 0 {
            debug!("Dropped {} expired cache entries ({} bytes)", removed, freed);
        }
    }

    pub fn current_size(&self) -> usize {
        self.current_size
    }
}

#[derive(Clone)]
pub struct SharedZoneCache(Arc<RwLock<ZoneCache>>);

impl fmt::Debug for SharedZoneCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedZoneCache")
            .field("inner", &"<ZoneCache>")
            .finish()
    }
}

impl SharedZoneCache {
    pub fn new(capacity: usize, ttl_seconds: u64) -> Self {
        Self(Arc::new(RwLock::new(ZoneCache::new(capacity, ttl_seconds))))
    }

    pub async fn get(&self, zone: &str) -> Option<ZoneInfo> {
        self.0.read().await.get(zone)
    }

    pub async fn insert(&self, name: String, zone: ZoneInfo) -> bool {
        self.0.write().await.insert(name, zone)
    }

    pub async fn invalidate(&self, zone: &str) {
        self.0.write().await.invalidate(zone);
    }
}
