/*!
 * Core Module
 * Fundamental harness types, guards and error handling
 */

pub mod errors;
pub mod guard;
pub mod limits;
pub mod types;

// Re-export for convenience
pub use errors::*;
pub use guard::{
    CleanupEvent, CleanupJournal, CleanupPhase, Guard, GuardDrop, GuardError, GuardId,
    GuardMetadata, GuardResult, HostedGuard, JournalMark, NativeGuard,
};
pub use types::*;
