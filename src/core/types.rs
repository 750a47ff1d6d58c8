/*!
 * Core Types
 * Enumerations shared by the frame chain, the emitter and the orchestrator
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Exception mechanism raised at the bottom of a frame chain
///
/// Crosses the module boundary by value, so the discriminants are part of
/// the export ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum ExceptionKind {
    /// Exception object thrown by the hosted runtime
    Hosted = 0,
    /// Language-level exception
    Native = 1,
    /// Code-based exception dispatched through filters
    Structured = 2,
}

impl ExceptionKind {
    pub const ALL: [ExceptionKind; 3] = [
        ExceptionKind::Hosted,
        ExceptionKind::Native,
        ExceptionKind::Structured,
    ];

    /// Message a matrix cell raises when none is configured
    pub fn default_message(self) -> &'static str {
        match self {
            ExceptionKind::Hosted => "Successfully caught hosted exception",
            ExceptionKind::Native => "Successfully caught native exception",
            ExceptionKind::Structured => "Successfully caught structured exception (SEH)",
        }
    }
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExceptionKind::Hosted => write!(f, "hosted"),
            ExceptionKind::Native => write!(f, "native"),
            ExceptionKind::Structured => write!(f, "structured"),
        }
    }
}

/// Where the terminal guard of a chain lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationSite {
    /// Torn down by scope exit, synchronously during unwinding
    Stack,
    /// Owned by the hosted collector; no teardown guarantee during unwinding
    Heap,
}

impl AllocationSite {
    pub const ALL: [AllocationSite; 2] = [AllocationSite::Stack, AllocationSite::Heap];
}

impl fmt::Display for AllocationSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationSite::Stack => write!(f, "stack"),
            AllocationSite::Heap => write!(f, "heap"),
        }
    }
}

/// Execution context a frame is built in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionContext {
    Hosted,
    Native,
}

impl ExecutionContext {
    /// Context of the level being built at `depth`
    ///
    /// Even depths are native, odd depths are hosted.
    #[inline]
    pub fn for_depth(depth: usize) -> Self {
        if depth % 2 == 0 {
            ExecutionContext::Native
        } else {
            ExecutionContext::Hosted
        }
    }

    /// Contexts of every guarded level of a chain of `depth`, outermost first
    pub fn sequence(depth: usize) -> Vec<ExecutionContext> {
        (1..=depth).rev().map(Self::for_depth).collect()
    }
}

impl fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionContext::Hosted => write!(f, "hosted"),
            ExecutionContext::Native => write!(f, "native"),
        }
    }
}
