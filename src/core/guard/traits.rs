/*!
 * Guard Traits
 *
 * Core abstractions for cleanup-bearing guards
 */

use super::{GuardMetadata, GuardResult};

/// Core guard trait
///
/// All guards must implement this to provide:
/// - Identity and placement metadata
/// - Activity check
/// - Manual release capability
pub trait Guard {
    /// Resource type name for logging/debugging
    fn resource_type(&self) -> &'static str;

    /// Get guard metadata
    fn metadata(&self) -> &GuardMetadata;

    /// Check if the guard has not been torn down yet
    fn is_active(&self) -> bool;

    /// Tear the guard down early
    ///
    /// Returns `Err` if already released. A released guard emits nothing
    /// further when it goes out of scope.
    fn release(&mut self) -> GuardResult<()>;
}

/// Guards that run their teardown from `Drop`
///
/// Separates Drop logic for better testability and observability
pub trait GuardDrop: Guard {
    /// Perform cleanup on drop
    ///
    /// # Panics
    ///
    /// Must NOT panic: it runs while unwinding.
    fn on_drop(&mut self);
}
