use crate::{CacheKey, CacheStats, CacheStatus, TranscodedBlob};
use lru::LruCache;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::OnceCell;
use tracing::instrument;

type Slot = Arc<OnceCell<Arc<TranscodedBlob>>>;

struct Inner {
    /// Finished containers. Only these are subject to eviction.
    entries: LruCache<CacheKey, Arc<TranscodedBlob>>,
    /// Computations in progress, moved into `entries` once they succeed.
    pending: HashMap<CacheKey, Slot>,
    hits: u64,
    misses: u64,
}

impl Inner {
    /// Move a finished slot out of `pending`, unless it was superseded by
    /// [`TranscodeCache::clear`] while computing.
    fn promote(&mut self, key: &CacheKey, slot: &Slot, blob: &Arc<TranscodedBlob>) {
        if !self.pending.get(key).is_some_and(|current| Arc::ptr_eq(current, slot)) {
            return;
        }
        self.pending.remove(key);
        match self.entries.push(key.clone(), Arc::clone(blob)) {
            Some((evicted, _)) if evicted != *key => {
                tracing::debug!(evicted = %evicted, "evicted least recently used container");
            },
            _ => {},
        }
    }
}

/// Bounded LRU of transcoded containers with single-flight computation.
///
/// The lock is only held for bookkeeping, never across the computation, so
/// unrelated keys transcode in parallel. Computations in progress live
/// outside the LRU and cannot be evicted.
pub struct TranscodeCache {
    inner: Mutex<Inner>,
}

impl TranscodeCache {
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::new(capacity),
                pending: HashMap::new(),
                hits: 0,
                misses: 0,
            }),
        }
    }

    /// Return the cached container for `key`, computing it at most once.
    ///
    /// Concurrent callers with the same key wait for whichever of them got
    /// there first and report [`CacheStatus::Hit`]. If the computation fails,
    /// its error goes to the caller that ran it, nothing is cached, and the
    /// next waiting (or later) caller starts over.
    ///
    /// # Examples
    ///
    /// ```
    /// use fastdog_cache::{CacheKey, CacheStatus, TranscodeCache, TranscodedBlob};
    /// use fastdog_container::FormatVersion;
    /// use std::num::NonZeroUsize;
    /// use std::path::Path;
    /// use time::OffsetDateTime;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let cache = TranscodeCache::new(NonZeroUsize::new(8).unwrap());
    /// let key = CacheKey::fingerprint(Path::new("/m/Duck.gltf"), OffsetDateTime::UNIX_EPOCH, 2);
    /// let build = || {
    ///     let key = key.clone();
    ///     async move { Ok::<_, std::io::Error>(TranscodedBlob::new(key, vec![1, 2, 3], 2, FormatVersion::Gltf)) }
    /// };
    ///
    /// let (_, first) = cache.get_or_compute(&key, build).await.unwrap();
    /// let (_, second) = cache.get_or_compute(&key, build).await.unwrap();
    /// assert_eq!((first, second), (CacheStatus::Miss, CacheStatus::Hit));
    /// # }
    /// ```
    #[instrument(skip(self, key, compute), fields(key = %key, status))]
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: &CacheKey,
        compute: F,
    ) -> Result<(Arc<TranscodedBlob>, CacheStatus), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TranscodedBlob, E>>,
    {
        let slot = {
            let mut inner = self.inner.lock();
            if let Some(blob) = inner.entries.get(key).cloned() {
                inner.hits += 1;
                tracing::Span::current().record("status", CacheStatus::Hit.as_str());
                return Ok((blob, CacheStatus::Hit));
            }
            Arc::clone(inner.pending.entry(key.clone()).or_default())
        };

        let ran = AtomicBool::new(false);
        let ran_flag = &ran;
        let result = slot
            .get_or_try_init(move || async move {
                ran_flag.store(true, Ordering::Relaxed);
                compute().await.map(Arc::new)
            })
            .await
            .map(Arc::clone);

        let mut inner = self.inner.lock();
        let status = if ran.load(Ordering::Relaxed) {
            inner.misses += 1;
            CacheStatus::Miss
        } else {
            inner.hits += 1;
            CacheStatus::Hit
        };
        tracing::Span::current().record("status", status.as_str());
        match result {
            Ok(blob) => {
                inner.promote(key, &slot, &blob);
                Ok((blob, status))
            },
            Err(err) => {
                // Held by the map and by this call only: nobody is waiting to retry.
                let idle = inner.pending.get(key).is_some_and(|current| Arc::ptr_eq(current, &slot))
                    && Arc::strong_count(&slot) == 2;
                if idle && !slot.initialized() {
                    inner.pending.remove(key);
                }
                Err(err)
            },
        }
    }

    /// Count a request that was satisfied by a pre-built container on disk.
    pub fn record_direct_hit(&self) {
        self.inner.lock().hits += 1;
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            total_requests: inner.hits + inner.misses,
            size: inner.entries.len(),
            capacity: inner.entries.cap().get(),
        }
    }

    /// Drop every entry and reset the counters.
    ///
    /// Computations already in flight still complete for their waiters but
    /// are not inserted.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        let dropped = inner.entries.len();
        inner.entries.clear();
        inner.pending.clear();
        inner.hits = 0;
        inner.misses = 0;
        tracing::info!(dropped, "transcode cache cleared");
    }
}
