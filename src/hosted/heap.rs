/*!
 * Hosted Heap
 * Deferred, out-of-band reclamation for hosted objects
 */

use log::{debug, info};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Object that can live on the hosted heap
///
/// Both hooks are called at most once, and `finalize` is skipped for objects
/// that were disposed.
pub trait HostedObject: Send + Sync + 'static {
    /// Eager cleanup, run when a holder disposes the object
    fn dispose(&self) {}

    /// Deferred cleanup, run by the collector
    fn finalize(&self) {}
}

struct Slot<T: ?Sized> {
    disposed: AtomicBool,
    finalized: AtomicBool,
    value: T,
}

impl<T: HostedObject + ?Sized> Slot<T> {
    fn dispose(&self) -> bool {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.value.dispose();
        true
    }

    fn finalize(&self) -> bool {
        if self.disposed.load(Ordering::SeqCst) || self.finalized.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.value.finalize();
        true
    }
}

/// Collection statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GcStats {
    /// Unreachable objects whose finalizer ran
    pub finalized: usize,
    /// Unreachable objects skipped because they were already disposed
    pub suppressed: usize,
    /// Objects still reachable after the pass
    pub survivors: usize,
    pub duration_us: u64,
}

impl GcStats {
    pub fn reclaimed(&self) -> usize {
        self.finalized + self.suppressed
    }

    pub fn freed_any(&self) -> bool {
        self.reclaimed() > 0
    }
}

/// Heap of hosted objects
///
/// An object is reachable while any `Gc` or `Scoped` handle to it exists.
/// Nothing is reclaimed until [`HostedHeap::collect`] runs.
pub struct HostedHeap {
    objects: Mutex<Vec<Arc<Slot<dyn HostedObject>>>>,
    allocations: AtomicU64,
    collections: AtomicU64,
}

thread_local! {
    static CURRENT: Arc<HostedHeap> = Arc::new(HostedHeap::new());
}

impl HostedHeap {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(Vec::new()),
            allocations: AtomicU64::new(0),
            collections: AtomicU64::new(0),
        }
    }

    /// Heap of the current thread, used by the frame primitives and emitter
    pub fn current() -> Arc<HostedHeap> {
        CURRENT.with(Arc::clone)
    }

    /// Allocate an object; the heap keeps it alive until collected
    pub fn alloc<T: HostedObject>(&self, value: T) -> Gc<T> {
        let slot = Arc::new(Slot {
            disposed: AtomicBool::new(false),
            finalized: AtomicBool::new(false),
            value,
        });
        let erased: Arc<Slot<dyn HostedObject>> = slot.clone();
        self.objects.lock().push(erased);
        self.allocations.fetch_add(1, Ordering::Relaxed);
        Gc { slot }
    }

    /// Reclaim every object no handle refers to
    ///
    /// Finalizers run after the heap lock is released, so they may allocate.
    pub fn collect(&self) -> GcStats {
        let start = Instant::now();
        let mut unreachable = Vec::new();
        let survivors = {
            let mut objects = self.objects.lock();
            objects.retain(|slot| {
                if Arc::strong_count(slot) == 1 {
                    unreachable.push(Arc::clone(slot));
                    false
                } else {
                    true
                }
            });
            objects.len()
        };

        let mut stats = GcStats {
            survivors,
            ..GcStats::default()
        };
        for slot in unreachable {
            if slot.finalize() {
                stats.finalized += 1;
            } else {
                stats.suppressed += 1;
            }
        }

        self.collections.fetch_add(1, Ordering::Relaxed);
        stats.duration_us = start.elapsed().as_micros() as u64;
        if stats.freed_any() {
            info!(
                "Hosted GC: finalized {} objects ({} suppressed, {} survivors) in {}us",
                stats.finalized, stats.suppressed, stats.survivors, stats.duration_us
            );
        } else {
            debug!("Hosted GC: nothing to reclaim ({} survivors)", stats.survivors);
        }
        stats
    }

    /// Objects currently tracked, reachable or not
    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tracked objects no handle refers to
    pub fn pending_finalization(&self) -> usize {
        self.objects
            .lock()
            .iter()
            .filter(|slot| Arc::strong_count(*slot) == 1)
            .count()
    }

    pub fn allocations(&self) -> u64 {
        self.allocations.load(Ordering::Relaxed)
    }

    pub fn collections(&self) -> u64 {
        self.collections.load(Ordering::Relaxed)
    }
}

impl Default for HostedHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HostedHeap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostedHeap")
            .field("objects", &self.len())
            .field("allocations", &self.allocations())
            .field("collections", &self.collections())
            .finish()
    }
}

/// Handle to a hosted object
///
/// Dropping a handle never runs cleanup; it only makes the object
/// collectable once no other handle remains.
pub struct Gc<T: HostedObject> {
    slot: Arc<Slot<T>>,
}

impl<T: HostedObject> Gc<T> {
    /// Run the eager cleanup now; returns false if it already ran
    pub fn dispose(&self) -> bool {
        self.slot.dispose()
    }

    pub fn is_disposed(&self) -> bool {
        self.slot.disposed.load(Ordering::SeqCst)
    }
}

impl<T: HostedObject> Clone for Gc<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: HostedObject> Deref for Gc<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.slot.value
    }
}

/// Hosted object with stack semantics: disposed when the handle leaves scope
pub struct Scoped<T: HostedObject> {
    handle: Gc<T>,
}

impl<T: HostedObject> Scoped<T> {
    pub fn new(handle: Gc<T>) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &Gc<T> {
        &self.handle
    }
}

impl<T: HostedObject> Deref for Scoped<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.handle
    }
}

impl<T: HostedObject> Drop for Scoped<T> {
    fn drop(&mut self) {
        if self.handle.is_disposed() {
            debug!("scoped object already disposed");
            return;
        }
        self.handle.dispose();
    }
}
