//! In-memory cache for authenticated place photos
//!
//! One entry per (place, variant). An entry is created by the first
//! successful fetch and shared by every caller asking for the same key until
//! the place is invalidated or the whole cache is cleared. Failed fetches are
//! never cached, so a later call retries.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::api::{BeanScoreApi, PhotoBytes};
use crate::config::DebugFlags;
use crate::error::ApiError;
use crate::models::PhotoVariant;

/// Shared reference to a cached image.
///
/// Cloning is cheap; all clones see the same buffer. Once the cache
/// releases the entry, `bytes()` returns None for every clone.
#[derive(Debug, Clone)]
pub struct PhotoHandle {
    inner: Arc<PhotoResource>,
}

#[derive(Debug)]
struct PhotoResource {
    bytes: RwLock<Option<Arc<[u8]>>>,
    content_type: String,
    size: usize,
}

impl PhotoHandle {
    fn new(photo: PhotoBytes) -> Self {
        let size = photo.bytes.len();
        Self {
            inner: Arc::new(PhotoResource {
                bytes: RwLock::new(Some(Arc::from(photo.bytes))),
                content_type: photo.content_type,
                size,
            }),
        }
    }

    /// Image data, or None after the handle was released
    pub fn bytes(&self) -> Option<Arc<[u8]>> {
        self.inner
            .bytes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn content_type(&self) -> &str {
        &self.inner.content_type
    }

    /// Size in bytes of the image as fetched
    pub fn size(&self) -> usize {
        self.inner.size
    }

    pub fn is_released(&self) -> bool {
        self.inner
            .bytes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// True if both handles point at the same cached resource
    pub fn same_resource(&self, other: &PhotoHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn release(&self) {
        *self
            .inner
            .bytes
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Entry count and total byte size, for the settings view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub count: usize,
    pub total_size: usize,
}

pub struct PhotoCache {
    api: Arc<BeanScoreApi>,
    entries: Mutex<HashMap<String, PhotoHandle>>,
    /// One lock per key with a fetch in progress
    in_flight: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    /// Per-place invalidation counters; a fetch is cached only if its
    /// place's counter and the epoch are unchanged when it completes
    generations: Mutex<HashMap<String, u64>>,
    /// Bumped by `clear_all`
    epoch: AtomicU64,
    debug: bool,
}

impl PhotoCache {
    pub fn new(api: Arc<BeanScoreApi>, debug: DebugFlags) -> Self {
        Self {
            api,
            entries: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
            generations: Mutex::new(HashMap::new()),
            epoch: AtomicU64::new(0),
            debug: debug.photos,
        }
    }

    /// Composite cache key for a place photo variant
    pub fn key(place_id: &str, variant: PhotoVariant) -> String {
        format!("{}|{}", place_id, variant.as_str())
    }

    /// Returns the photo for a place, fetching it at most once per key.
    ///
    /// Missing credentials, a 404, or any failed request all resolve to None.
    /// Dropping the future before it completes leaves the cache untouched.
    pub async fn resolve(&self, place_id: &str, variant: PhotoVariant) -> Option<PhotoHandle> {
        let key = Self::key(place_id, variant);
        if let Some(handle) = self.lookup(&key) {
            return Some(handle);
        }

        let _in_flight = self.begin_fetch(&key).await;

        // Another caller may have finished the fetch while we waited
        if let Some(handle) = self.lookup(&key) {
            return Some(handle);
        }

        let generation = self.generation(place_id);
        if self.debug {
            log::debug!("Photo cache miss for {key}, fetching");
        }

        let handle = PhotoHandle::new(self.fetch(place_id, variant).await?);

        if self.generation(place_id) != generation {
            log::debug!("Cache invalidated while fetching {key}, not caching result");
            return Some(handle);
        }

        let previous = self.entries().insert(key.clone(), handle.clone());
        if let Some(previous) = previous {
            previous.release();
        }
        if self.debug {
            log::debug!("Cached {key} ({} bytes)", handle.size());
        }
        Some(handle)
    }

    /// Drops both variants of a place's photo and releases their buffers.
    ///
    /// Call after the photo was replaced or deleted.
    pub fn invalidate(&self, place_id: &str) {
        *self
            .generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(place_id.to_string())
            .or_default() += 1;
        let mut entries = self.entries();
        for variant in PhotoVariant::all() {
            if let Some(handle) = entries.remove(&Self::key(place_id, *variant)) {
                handle.release();
                log::debug!("Invalidated {variant} photo for place {place_id}");
            }
        }
    }

    /// Releases every cached photo.
    pub fn clear_all(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let mut entries = self.entries();
        let count = entries.len();
        for (_, handle) in entries.drain() {
            handle.release();
        }
        log::info!("Cleared photo cache ({count} entries)");
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries();
        CacheStats {
            count: entries.len(),
            total_size: entries.values().map(PhotoHandle::size).sum(),
        }
    }

    pub fn contains(&self, place_id: &str, variant: PhotoVariant) -> bool {
        self.entries().contains_key(&Self::key(place_id, variant))
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, PhotoHandle>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// (epoch, place counter) snapshot compared before caching a fetch
    fn generation(&self, place_id: &str) -> (u64, u64) {
        let place = self
            .generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(place_id)
            .copied()
            .unwrap_or(0);
        (self.epoch.load(Ordering::SeqCst), place)
    }

    fn lookup(&self, key: &str) -> Option<PhotoHandle> {
        let handle = self.entries().get(key).cloned();
        if handle.is_some() && self.debug {
            log::debug!("Photo cache hit for {key}");
        }
        handle
    }

    async fn begin_fetch(&self, key: &str) -> InFlight<'_> {
        let lock = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(in_flight.entry(key.to_string()).or_default())
        };
        let guard = Arc::clone(&lock).lock_owned().await;
        InFlight {
            cache: self,
            key: key.to_string(),
            lock,
            _guard: guard,
        }
    }

    async fn fetch(&self, place_id: &str, variant: PhotoVariant) -> Option<PhotoBytes> {
        match self.api.fetch_photo(place_id, variant).await {
            Ok(Some(photo)) => Some(photo),
            Ok(None) => {
                if self.debug {
                    log::debug!("Place {place_id} has no {variant} photo");
                }
                None
            }
            Err(ApiError::NotAuthenticated) => {
                log::debug!("No token stored, skipping photo fetch for {place_id}");
                None
            }
            Err(e) => {
                log::error!("Failed to fetch {variant} photo for place {place_id}: {e}");
                None
            }
        }
    }
}

/// Holds the per-key fetch lock and removes it from the in-flight map when
/// the fetch finishes or is cancelled.
struct InFlight<'a> {
    cache: &'a PhotoCache,
    key: String,
    lock: Arc<AsyncMutex<()>>,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut in_flight = self
            .cache
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if in_flight
            .get(&self.key)
            .is_some_and(|lock| Arc::ptr_eq(lock, &self.lock))
        {
            in_flight.remove(&self.key);
        }
    }
}

#[cfg(test)]
#[path = "photo_cache_tests.rs"]
mod tests;
