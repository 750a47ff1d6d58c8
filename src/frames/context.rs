/*!
 * Frame Contexts
 *
 * The two frame-construction primitives. Each builds one stack-scoped guard in
 * its own context and calls back; the shape is shared, only the guard differs.
 */

use crate::core::guard::{HostedGuard, NativeGuard};
use crate::core::types::ExecutionContext;
use crate::hosted::{HostedHeap, Scoped};

/// Callback invoked by a frame primitive once its guard exists
pub type FrameCallback = extern "C-unwind" fn(usize);

/// A context that can host one level of a frame chain
pub trait FrameContext {
    const CONTEXT: ExecutionContext;

    /// Stack-scoped guard owned by the frame
    type Guard;

    fn acquire(tag: usize) -> Self::Guard;

    /// Build one frame: acquire the guard, then call back with `depth`
    ///
    /// The guard outlives the callback, whether it returns or unwinds.
    #[inline(never)]
    fn enter(depth: usize, callback: FrameCallback) {
        let _guard = Self::acquire(depth);
        callback(depth);
    }
}

/// Native frame: guard torn down by `Drop`
pub struct NativeFrame;

impl FrameContext for NativeFrame {
    const CONTEXT: ExecutionContext = ExecutionContext::Native;
    type Guard = NativeGuard;

    fn acquire(tag: usize) -> NativeGuard {
        NativeGuard::new(tag)
    }
}

/// Hosted frame: guard is a hosted object with stack semantics
pub struct HostedFrame;

impl FrameContext for HostedFrame {
    const CONTEXT: ExecutionContext = ExecutionContext::Hosted;
    type Guard = Scoped<HostedGuard>;

    fn acquire(tag: usize) -> Scoped<HostedGuard> {
        HostedGuard::scoped(&HostedHeap::current(), tag)
    }
}
