use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, info};

use crate::provider::ProviderId;
use crate::version::error::ResolveError;
use crate::version::types::{BuildDescriptor, DownloadTarget, VersionSet};

/// Source of the current time in milliseconds since UNIX epoch
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(start_ms),
        }
    }

    pub fn advance(&self, ms: i64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Freshness of a cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Never successfully fetched
    Empty,
    /// Fetched less than one TTL ago
    Fresh,
    /// Holds a value older than the TTL; the next read refreshes it
    Stale,
}

struct Entry<V> {
    value: V,
    updated_at: i64,
}

/// Per-key storage. `entry` is only ever replaced wholesale, so readers see
/// either the previous or the new value. `refresh` serializes refreshes of
/// this key only and holds the failure of the last completed attempt;
/// `attempts` counts completed attempts and only changes under that gate.
struct Slot<V, E> {
    entry: RwLock<Option<Arc<Entry<V>>>>,
    refresh: tokio::sync::Mutex<Option<E>>,
    attempts: AtomicU64,
}

impl<V, E> Default for Slot<V, E> {
    fn default() -> Self {
        Self {
            entry: RwLock::new(None),
            refresh: tokio::sync::Mutex::new(None),
            attempts: AtomicU64::new(0),
        }
    }
}

/// In-memory map with a time-to-live per read and single-flight refresh.
///
/// Concurrent readers of a stale key wait for one refresh and share its
/// outcome, success or failure, instead of each calling the upstream. The
/// refresh gate is per key, and the map lock is never held across an
/// `.await`, so a slow upstream only delays callers of that same key.
///
/// The refresh runs inside the future of the caller that won the gate. If
/// that caller is dropped mid-fetch, the attempt does not complete and the
/// next waiter starts its own fetch.
pub struct TtlCache<K, V, E> {
    slots: Mutex<HashMap<K, Arc<Slot<V, E>>>>,
    clock: Arc<dyn Clock>,
}

impl<K, V, E> TtlCache<K, V, E>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
    E: Clone,
{
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn slot(&self, key: &K) -> Arc<Slot<V, E>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(key.clone()).or_default().clone()
    }

    fn current(slot: &Slot<V, E>) -> Option<Arc<Entry<V>>> {
        slot.entry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn is_fresh(&self, entry: &Entry<V>, ttl_ms: i64) -> bool {
        self.clock.now_ms().saturating_sub(entry.updated_at) < ttl_ms
    }

    fn fresh_value(&self, slot: &Slot<V, E>, ttl_ms: i64) -> Option<V> {
        Self::current(slot)
            .filter(|entry| self.is_fresh(entry, ttl_ms))
            .map(|entry| entry.value.clone())
    }

    /// Return the cached value if younger than `ttl_ms`, otherwise run `fetch`
    /// and store its result.
    ///
    /// A failed fetch is returned to the caller, and to every caller that was
    /// already waiting on that attempt, and leaves any previous value in
    /// place; the next read retries.
    pub async fn get_or_refresh<F, Fut>(&self, key: &K, ttl_ms: i64, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let slot = self.slot(key);

        if let Some(value) = self.fresh_value(&slot, ttl_ms) {
            debug!("Cache hit for {:?}", key);
            return Ok(value);
        }

        let seen = slot.attempts.load(Ordering::SeqCst);
        let mut last_failure = slot.refresh.lock().await;

        // An attempt completed while we waited on the gate
        if slot.attempts.load(Ordering::SeqCst) != seen {
            if let Some(err) = last_failure.as_ref() {
                debug!("Sharing failed refresh of {:?} with waiting caller", key);
                return Err(err.clone());
            }
            if let Some(entry) = Self::current(&slot) {
                debug!("Cache refreshed by concurrent caller for {:?}", key);
                return Ok(entry.value.clone());
            }
        }

        debug!("Cache miss for {:?}, refreshing", key);
        let result = fetch().await;

        match &result {
            Ok(value) => {
                let entry = Arc::new(Entry {
                    value: value.clone(),
                    updated_at: self.clock.now_ms(),
                });
                *slot.entry.write().unwrap_or_else(PoisonError::into_inner) = Some(entry);
                *last_failure = None;
            }
            Err(err) => *last_failure = Some(err.clone()),
        }
        slot.attempts.fetch_add(1, Ordering::SeqCst);

        result
    }

    pub fn state(&self, key: &K, ttl_ms: i64) -> CacheState {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        match slots.get(key).and_then(|slot| Self::current(slot)) {
            None => CacheState::Empty,
            Some(entry) if self.is_fresh(&entry, ttl_ms) => CacheState::Fresh,
            Some(_) => CacheState::Stale,
        }
    }
}

/// Key for per-version data: provider and version label
pub type VersionKey = (ProviderId, String);

/// Key for resolved downloads: provider, version label and optional build
pub type DownloadKey = (ProviderId, String, Option<String>);

/// Release data for every provider: version lists, per-version build lists
/// and resolved download URLs for providers where resolving costs an extra
/// round trip.
pub struct ReleaseCache {
    versions: TtlCache<ProviderId, Arc<VersionSet>, ResolveError>,
    builds: TtlCache<VersionKey, Arc<Vec<BuildDescriptor>>, ResolveError>,
    downloads: TtlCache<DownloadKey, DownloadTarget, ResolveError>,
}

impl ReleaseCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            versions: TtlCache::new(clock.clone()),
            builds: TtlCache::new(clock.clone()),
            downloads: TtlCache::new(clock),
        }
    }

    pub async fn versions<F, Fut>(
        &self,
        provider: ProviderId,
        ttl_ms: i64,
        fetch: F,
    ) -> Result<Arc<VersionSet>, ResolveError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<VersionSet, ResolveError>>,
    {
        self.versions
            .get_or_refresh(&provider, ttl_ms, move || async move {
                let set = fetch().await?;
                info!("Cached {} versions for {}", set.len(), provider);
                Ok(Arc::new(set))
            })
            .await
    }

    pub async fn builds<F, Fut>(
        &self,
        provider: ProviderId,
        version: &str,
        ttl_ms: i64,
        fetch: F,
    ) -> Result<Arc<Vec<BuildDescriptor>>, ResolveError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<BuildDescriptor>, ResolveError>>,
    {
        let key = (provider, version.to_string());
        self.builds
            .get_or_refresh(&key, ttl_ms, move || async move {
                let builds = fetch().await?;
                info!("Cached {} builds for {} {}", builds.len(), provider, version);
                Ok(Arc::new(builds))
            })
            .await
    }

    pub async fn download<F, Fut>(
        &self,
        key: DownloadKey,
        ttl_ms: i64,
        fetch: F,
    ) -> Result<DownloadTarget, ResolveError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<DownloadTarget, ResolveError>>,
    {
        self.downloads.get_or_refresh(&key, ttl_ms, fetch).await
    }

    pub fn versions_state(&self, provider: ProviderId, ttl_ms: i64) -> CacheState {
        self.versions.state(&provider, ttl_ms)
    }

    pub fn builds_state(&self, provider: ProviderId, version: &str, ttl_ms: i64) -> CacheState {
        self.builds.state(&(provider, version.to_string()), ttl_ms)
    }
}

impl Default for ReleaseCache {
    fn default() -> Self {
        Self::new()
    }
}
