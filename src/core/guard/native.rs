/*!
 * Native Guards
 *
 * Stack-scoped guards of the native context. Teardown is `Drop`.
 */

use super::traits::{Guard, GuardDrop};
use super::{CleanupPhase, GuardError, GuardMetadata, GuardResult};
use crate::core::types::{AllocationSite, ExecutionContext};
use log::trace;

/// Native-context guard with deterministic teardown
///
/// # Example
///
/// ```ignore
/// fn frame(depth: usize) {
///     let _guard = NativeGuard::new(depth);
///     // Torn down on return and while unwinding
/// }
/// ```
pub struct NativeGuard {
    metadata: GuardMetadata,
    active: bool,
}

impl NativeGuard {
    pub fn new(tag: usize) -> Self {
        let metadata = GuardMetadata::new(tag, AllocationSite::Stack, ExecutionContext::Native);
        trace!("+++ {:4} - NativeGuard {}", tag, metadata.id);
        Self {
            metadata,
            active: true,
        }
    }

    fn teardown(&mut self) {
        self.active = false;
        trace!(
            "--- {:4} - {} guard {} after {}us",
            self.metadata.tag,
            self.resource_type(),
            self.metadata.id,
            self.metadata.lifetime_micros()
        );
        self.metadata.emit(CleanupPhase::Destroyed);
    }
}

impl Guard for NativeGuard {
    fn resource_type(&self) -> &'static str {
        "native"
    }

    fn metadata(&self) -> &GuardMetadata {
        &self.metadata
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn release(&mut self) -> GuardResult<()> {
        if !self.active {
            return Err(GuardError::AlreadyReleased(self.metadata.id));
        }
        self.teardown();
        Ok(())
    }
}

impl GuardDrop for NativeGuard {
    fn on_drop(&mut self) {
        if self.active {
            self.teardown();
        }
    }
}

impl Drop for NativeGuard {
    fn drop(&mut self) {
        self.on_drop();
    }
}
