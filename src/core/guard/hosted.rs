/*!
 * Hosted Guards
 *
 * Guards that live on the hosted heap. How they are held decides when they
 * are torn down:
 *
 * - `Scoped<HostedGuard>`: disposed at scope exit, like a native guard
 * - `Gc<HostedGuard>`: finalized whenever the collector next finds it
 *   unreachable, which may be after the case or never
 */

use super::traits::Guard;
use super::{CleanupPhase, GuardError, GuardMetadata, GuardResult};
use crate::core::types::{AllocationSite, ExecutionContext};
use crate::hosted::{Gc, HostedHeap, HostedObject, Scoped};
use log::trace;
use std::sync::atomic::{AtomicBool, Ordering};

/// Hosted-context guard
///
/// Emits exactly one of `Disposed` or `Finalized`, whichever comes first.
pub struct HostedGuard {
    metadata: GuardMetadata,
    torn_down: AtomicBool,
}

impl HostedGuard {
    pub fn new(tag: usize, site: AllocationSite) -> Self {
        let metadata = GuardMetadata::new(tag, site, ExecutionContext::Hosted);
        trace!("+++ {:4} - HostedGuard {} ({})", tag, metadata.id, site);
        Self {
            metadata,
            torn_down: AtomicBool::new(false),
        }
    }

    /// Allocate a stack-scoped guard: disposed when the handle leaves scope
    pub fn scoped(heap: &HostedHeap, tag: usize) -> Scoped<HostedGuard> {
        Scoped::new(heap.alloc(Self::new(tag, AllocationSite::Stack)))
    }

    /// Allocate a heap-scoped guard: ownership moves to the collector
    pub fn collected(heap: &HostedHeap, tag: usize) -> Gc<HostedGuard> {
        heap.alloc(Self::new(tag, AllocationSite::Heap))
    }

    fn teardown(&self, phase: CleanupPhase) -> bool {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return false;
        }
        trace!(
            "--- {:4} - {} guard {} {:?}",
            self.metadata.tag,
            self.resource_type(),
            self.metadata.id,
            phase
        );
        self.metadata.emit(phase);
        true
    }
}

impl HostedObject for HostedGuard {
    fn dispose(&self) {
        self.teardown(CleanupPhase::Disposed);
    }

    fn finalize(&self) {
        self.teardown(CleanupPhase::Finalized);
    }
}

impl Guard for HostedGuard {
    fn resource_type(&self) -> &'static str {
        "hosted"
    }

    fn metadata(&self) -> &GuardMetadata {
        &self.metadata
    }

    fn is_active(&self) -> bool {
        !self.torn_down.load(Ordering::SeqCst)
    }

    fn release(&mut self) -> GuardResult<()> {
        if self.teardown(CleanupPhase::Disposed) {
            Ok(())
        } else {
            Err(GuardError::AlreadyReleased(self.metadata.id))
        }
    }
}
