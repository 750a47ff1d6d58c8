/*!
 * RAII Resource Guards
 *
 * Cleanup-bearing values that report their own teardown.
 *
 * ## Guard Types
 *
 * - **NativeGuard**: Native-context guard, torn down by `Drop`
 * - **HostedGuard**: Hosted object; stack-scoped through `Scoped`, heap-scoped
 *   through `Gc`
 *
 * Every teardown is appended to the per-thread [`CleanupJournal`], which is
 * what the orchestrator inspects to check ordering.
 *
 * ## Example
 *
 * ```rust
 * use unwind_harness::core::guard::{CleanupJournal, NativeGuard};
 *
 * let mark = CleanupJournal::mark();
 * {
 *     let _outer = NativeGuard::new(2);
 *     let _inner = NativeGuard::new(1);
 * }
 * let tags: Vec<usize> = CleanupJournal::since(mark).iter().map(|e| e.tag).collect();
 * assert_eq!(tags, vec![1, 2]);
 * ```
 */

mod hosted;
mod journal;
mod native;
mod traits;

pub use hosted::HostedGuard;
pub use journal::{CleanupEvent, CleanupJournal, CleanupPhase, JournalMark};
pub use native::NativeGuard;
pub use traits::{Guard, GuardDrop};

use crate::core::types::{AllocationSite, ExecutionContext};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Result type for guard operations
pub type GuardResult<T> = Result<T, GuardError>;

/// Errors that can occur during guard operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    #[error("Resource already released: guard {0}")]
    AlreadyReleased(GuardId),
}

/// Process-wide guard identity
///
/// Drawn from a single counter, so on any one thread creation order and id
/// order agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuardId(u64);

static NEXT_GUARD_ID: AtomicU64 = AtomicU64::new(1);

impl GuardId {
    #[inline]
    pub fn next() -> Self {
        Self(NEXT_GUARD_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GuardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Guard metadata for observability
#[derive(Debug, Clone)]
pub struct GuardMetadata {
    pub id: GuardId,
    /// Depth value of the level that created the guard
    pub tag: usize,
    pub site: AllocationSite,
    pub context: ExecutionContext,
    pub creation_time: std::time::Instant,
}

impl GuardMetadata {
    #[inline]
    pub fn new(tag: usize, site: AllocationSite, context: ExecutionContext) -> Self {
        Self {
            id: GuardId::next(),
            tag,
            site,
            context,
            creation_time: std::time::Instant::now(),
        }
    }

    #[inline]
    pub fn lifetime_micros(&self) -> u64 {
        self.creation_time.elapsed().as_micros() as u64
    }

    /// Append a teardown event for this guard to the journal
    pub(crate) fn emit(&self, phase: CleanupPhase) {
        CleanupJournal::record(CleanupEvent {
            id: self.id,
            tag: self.tag,
            site: self.site,
            context: self.context,
            phase,
        });
    }
}
