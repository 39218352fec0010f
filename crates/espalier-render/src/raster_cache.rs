//! Background rasterization with single-flight semantics.
//!
//! [`RasterCache`] moves bitmap generation off the UI thread. The UI thread asks
//! for a bitmap by visual-state key; if it is not ready yet, a build job is sent
//! to one named worker thread, unless a job for the same key is already in
//! flight. Finished bitmaps travel back over a channel and only become visible
//! when the UI thread calls [`RasterCache::poll`], so the UI thread never reads
//! a bitmap that is still being written.
//!
//! # Ownership
//!
//! Keys usually embed the id of the widget that wants the bitmap. `poll` takes a
//! liveness predicate; results for owners that no longer exist are dropped
//! instead of being cached. Dropping a widget mid-build is therefore harmless.
//!
//! ```
//! use espalier_render::{Bitmap, Color, RasterCache};
//!
//! let mut cache = RasterCache::<u32>::new().unwrap();
//! assert!(cache.request(7, || Bitmap::filled(4, 4, Color::WHITE).unwrap()).unwrap().is_none());
//!
//! let bitmap = cache.wait_for(&7, |_| true).unwrap();
//! assert_eq!(bitmap.width(), 4);
//! assert!(cache.request(7, || unreachable!()).unwrap().is_some());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;

use crate::bitmap::Bitmap;
use crate::error::{RenderError, RenderResult};

const RASTER_TARGET: &str = "espalier_render::raster";

type BuildFn = Box<dyn FnOnce() -> Bitmap + Send + 'static>;

struct Job<K> {
    key: K,
    build: BuildFn,
}

struct Finished<K> {
    key: K,
    bitmap: Bitmap,
}

enum Entry {
    Pending,
    Ready(Arc<Bitmap>),
}

/// Counters shared between the UI thread and the worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RasterStats {
    /// Build jobs sent to the worker.
    pub requested: usize,
    /// Builds the worker finished.
    pub built: usize,
    /// Finished builds discarded because their owner was gone or the key was forgotten.
    pub dropped: usize,
}

/// Single-producer single-consumer bitmap cache keyed by visual state.
pub struct RasterCache<K> {
    entries: HashMap<K, Entry>,
    jobs: Option<Sender<Job<K>>>,
    results: Receiver<Finished<K>>,
    worker: Option<JoinHandle<()>>,
    stats: Arc<Mutex<RasterStats>>,
}

impl<K> RasterCache<K>
where
    K: Eq + Hash + Clone + Send + fmt::Debug + 'static,
{
    /// Start the worker thread.
    pub fn new() -> RenderResult<Self> {
        let (job_tx, job_rx) = unbounded::<Job<K>>();
        let (result_tx, result_rx) = unbounded::<Finished<K>>();
        let stats = Arc::new(Mutex::new(RasterStats::default()));
        let worker_stats = Arc::clone(&stats);

        let worker = thread::Builder::new()
            .name("espalier-raster".to_string())
            .spawn(move || {
                for job in job_rx {
                    let bitmap = (job.build)();
                    worker_stats.lock().built += 1;
                    if result_tx
                        .send(Finished {
                            key: job.key,
                            bitmap,
                        })
                        .is_err()
                    {
                        break;
                    }
                }
                tracing::trace!(target: RASTER_TARGET, "raster worker exiting");
            })?;

        Ok(Self {
            entries: HashMap::new(),
            jobs: Some(job_tx),
            results: result_rx,
            worker: Some(worker),
            stats,
        })
    }

    /// Return the ready bitmap for `key`, or schedule `build` for it.
    ///
    /// A build is only scheduled if none is pending for the same key, so calling
    /// this every frame while a build is in flight is cheap.
    pub fn request<F>(&mut self, key: K, build: F) -> RenderResult<Option<Arc<Bitmap>>>
    where
        F: FnOnce() -> Bitmap + Send + 'static,
    {
        match self.entries.get(&key) {
            Some(Entry::Ready(bitmap)) => return Ok(Some(Arc::clone(bitmap))),
            Some(Entry::Pending) => return Ok(None),
            None => {}
        }

        let jobs = self.jobs.as_ref().ok_or(RenderError::WorkerDisconnected)?;
        jobs.send(Job {
            key: key.clone(),
            build: Box::new(build),
        })
        .map_err(|_| RenderError::WorkerDisconnected)?;

        tracing::trace!(target: RASTER_TARGET, ?key, "scheduled raster build");
        self.stats.lock().requested += 1;
        self.entries.insert(key, Entry::Pending);
        Ok(None)
    }

    /// Ready bitmap for `key`, without scheduling anything.
    pub fn get(&self, key: &K) -> Option<Arc<Bitmap>> {
        match self.entries.get(key) {
            Some(Entry::Ready(bitmap)) => Some(Arc::clone(bitmap)),
            _ => None,
        }
    }

    /// Check whether a build for `key` is in flight.
    pub fn is_pending(&self, key: &K) -> bool {
        matches!(self.entries.get(key), Some(Entry::Pending))
    }

    /// Move finished builds into the cache.
    ///
    /// Results whose owner fails `is_alive`, or whose key was forgotten while the
    /// build ran, are dropped. Returns the number of bitmaps that became ready.
    pub fn poll<F>(&mut self, is_alive: F) -> usize
    where
        F: Fn(&K) -> bool,
    {
        let mut ready = 0;
        while let Ok(finished) = self.results.try_recv() {
            if self.accept(finished, &is_alive) {
                ready += 1;
            }
        }
        ready
    }

    /// Block until the pending build for `key` finishes, then return it.
    ///
    /// Other results arriving meanwhile are handled as in [`poll`](Self::poll).
    /// Returns `None` if nothing is pending for `key` or the owner is gone.
    pub fn wait_for<F>(&mut self, key: &K, is_alive: F) -> Option<Arc<Bitmap>>
    where
        F: Fn(&K) -> bool,
    {
        while self.is_pending(key) {
            let finished = self.results.recv().ok()?;
            self.accept(finished, &is_alive);
        }
        self.get(key)
    }

    fn accept<F>(&mut self, finished: Finished<K>, is_alive: &F) -> bool
    where
        F: Fn(&K) -> bool,
    {
        let Finished { key, bitmap } = finished;
        let wanted = matches!(self.entries.get(&key), Some(Entry::Pending));
        if wanted && is_alive(&key) {
            self.entries.insert(key, Entry::Ready(Arc::new(bitmap)));
            true
        } else {
            tracing::trace!(target: RASTER_TARGET, ?key, "dropping raster result");
            if wanted {
                self.entries.remove(&key);
            }
            self.stats.lock().dropped += 1;
            false
        }
    }

    /// Evict one key, ready or pending.
    pub fn forget(&mut self, key: &K) {
        self.entries.remove(key);
    }

    /// Evict every key matching `predicate`.
    pub fn forget_where<F>(&mut self, predicate: F)
    where
        F: Fn(&K) -> bool,
    {
        self.entries.retain(|key, _| !predicate(key));
    }

    /// Number of ready bitmaps.
    pub fn ready_len(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| matches!(entry, Entry::Ready(_)))
            .count()
    }

    /// Snapshot of the worker counters.
    pub fn stats(&self) -> RasterStats {
        *self.stats.lock()
    }
}

impl<K> fmt::Debug for RasterCache<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterCache")
            .field("entries", &self.entries.len())
            .field("stats", &*self.stats.lock())
            .finish()
    }
}

impl<K> Drop for RasterCache<K> {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop.
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!(target: RASTER_TARGET, "raster worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::types::Color;

    fn solid(width: u32) -> Bitmap {
        Bitmap::filled(width, 1, Color::WHITE).unwrap()
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    #[test]
    fn test_request_then_ready() {
        init_tracing();
        let mut cache = RasterCache::<u8>::new().unwrap();
        assert!(cache.request(1, || solid(3)).unwrap().is_none());
        assert!(cache.is_pending(&1));

        let bitmap = cache.wait_for(&1, |_| true).unwrap();
        assert_eq!(bitmap.width(), 3);
        assert!(!cache.is_pending(&1));
        assert_eq!(cache.ready_len(), 1);

        let again = cache.request(1, || solid(9)).unwrap().unwrap();
        assert!(Arc::ptr_eq(&bitmap, &again));
    }

    #[test]
    fn test_single_flight() {
        let builds = Arc::new(AtomicUsize::new(0));
        let mut cache = RasterCache::<u8>::new().unwrap();
        for _ in 0..5 {
            let builds = Arc::clone(&builds);
            cache
                .request(2, move || {
                    builds.fetch_add(1, Ordering::SeqCst);
                    solid(1)
                })
                .unwrap();
        }
        cache.wait_for(&2, |_| true).unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().requested, 1);
    }

    #[test]
    fn test_dead_owner_result_dropped() {
        let mut cache = RasterCache::<u8>::new().unwrap();
        cache.request(3, || solid(1)).unwrap();
        assert!(cache.wait_for(&3, |_| false).is_none());
        assert!(cache.get(&3).is_none());
        assert!(!cache.is_pending(&3));
        assert_eq!(cache.stats().dropped, 1);
    }

    #[test]
    fn test_forgotten_key_result_dropped() {
        let mut cache = RasterCache::<u8>::new().unwrap();
        cache.request(4, || solid(1)).unwrap();
        cache.request(5, || solid(2)).unwrap();
        cache.forget(&4);
        cache.wait_for(&5, |_| true).unwrap();
        // The result for 4 was either dropped before or arrives now.
        while cache.stats().built < 2 {
            thread::yield_now();
        }
        cache.poll(|_| true);
        assert!(cache.get(&4).is_none());
        assert!(cache.get(&5).is_some());
    }

    #[test]
    fn test_forget_where() {
        let mut cache = RasterCache::<(u8, u8)>::new().unwrap();
        cache.request((1, 0), || solid(1)).unwrap();
        cache.request((2, 0), || solid(1)).unwrap();
        cache.wait_for(&(1, 0), |_| true);
        cache.wait_for(&(2, 0), |_| true);
        cache.forget_where(|(owner, _)| *owner == 1);
        assert!(cache.get(&(1, 0)).is_none());
        assert!(cache.get(&(2, 0)).is_some());
    }

    #[test]
    fn test_drop_with_pending_build() {
        let mut cache = RasterCache::<u8>::new().unwrap();
        cache.request(6, || solid(1)).unwrap();
        drop(cache);
    }
}
