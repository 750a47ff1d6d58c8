/*!
 * Unwind Harness Library
 *
 * Conformance checks for exception propagation across alternating hosted and
 * native frames:
 * - Hosted, native and structured exceptions raised from stack or heap guards
 * - Frame chains built through a module's exported entry points
 * - Guard teardown order and payload integrity verified per case
 */

pub mod config;
pub mod core;
pub mod dispatch;
pub mod emitter;
pub mod exceptions;
pub mod frames;
pub mod hosted;
pub mod monitoring;
pub mod orchestrator;

// Re-exports
pub use config::HarnessConfig;
pub use crate::core::{
    AllocationSite, CaseFailure, CleanupEvent, CleanupJournal, CleanupPhase, ExceptionKind,
    ExecutionContext, HarnessError, HarnessResult, SetupError, SetupResult,
};
pub use dispatch::{DispatchTable, ExportTable, ModuleRegistry, SymbolSource};
pub use exceptions::{HostedException, NativeException, StructuredException};
pub use frames::FrameAlternator;
pub use hosted::{GcStats, HostedHeap};
pub use monitoring::init_tracing;
pub use orchestrator::{CaseReport, MatrixReport, Orchestrator, TestCase, TestMatrix, Verdict};
