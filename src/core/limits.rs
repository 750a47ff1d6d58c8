/*!
 * Harness Limits and Constants
 *
 * Centralized location for the fixed codes, slot counts and defaults used by
 * the frame chain and the orchestrator.
 */

// =============================================================================
// STRUCTURED EXCEPTIONS
// =============================================================================

/// User-defined structured exception code raised by the test matrix
pub const TEST_EXCEPTION_CODE: u32 = 0xE000_1111;

/// Information words carried by a structured exception record
/// Extra arguments passed to a raise are dropped
pub const MAXIMUM_PARAMETERS: usize = 15;

/// Information slot holding the message address
pub const MESSAGE_ADDRESS_SLOT: usize = 0;

/// Information slot holding the message length in bytes
pub const MESSAGE_LENGTH_SLOT: usize = 1;

// =============================================================================
// FRAME CHAIN
// =============================================================================

/// Tag carried by the guard the emitter creates at the bottom of a chain
pub const TERMINAL_GUARD_TAG: usize = 0;

/// Depths exercised when none are configured
pub const DEFAULT_DEPTHS: &[usize] = &[0, 3, 5, 9, 11];

/// Deepest chain the harness accepts
/// Each level costs two native frames plus a hosted allocation
pub const MAX_DEPTH: usize = 4096;

// =============================================================================
// MODULE BOUNDARY
// =============================================================================

/// Relative path of the built-in frame module
pub const BUILTIN_MODULE_PATH: &str = "./unwind-frames.module";
