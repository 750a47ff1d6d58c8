/*!
 * Frame Alternator
 *
 * Builds a call chain of a given depth, switching execution context at every
 * level, and runs a continuation at the bottom.
 *
 * Frame primitives only pass a depth to their callback, so the continuation
 * and the builder for the running chain sit in a per-thread slot. Chains
 * nest: a continuation may start another chain.
 */

use super::context::{FrameCallback, FrameContext, HostedFrame, NativeFrame};
use crate::core::guard::HostedGuard;
use crate::core::types::ExecutionContext;
use crate::hosted::HostedHeap;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{trace, warn};

/// Something that can build one frame in a given context
pub trait FrameBuilder {
    fn build_frame(&self, context: ExecutionContext, depth: usize, callback: FrameCallback);
}

/// Builds frames by calling the primitives in this crate directly
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFrames;

impl FrameBuilder for LocalFrames {
    fn build_frame(&self, context: ExecutionContext, depth: usize, callback: FrameCallback) {
        match context {
            ExecutionContext::Native => NativeFrame::enter(depth, callback),
            ExecutionContext::Hosted => HostedFrame::enter(depth, callback),
        }
    }
}

/// Builder for a hosted-context driver
///
/// Holds a stack-scoped hosted guard, tagged with the depth, around every
/// hosted frame it requests from `inner`. The guard is torn down right after
/// the one the frame itself creates.
pub struct HostedDriverFrames<B> {
    inner: B,
    heap: Arc<HostedHeap>,
}

impl<B: FrameBuilder> HostedDriverFrames<B> {
    pub fn new(inner: B, heap: Arc<HostedHeap>) -> Self {
        Self { inner, heap }
    }
}

impl<B: FrameBuilder> FrameBuilder for HostedDriverFrames<B> {
    fn build_frame(&self, context: ExecutionContext, depth: usize, callback: FrameCallback) {
        match context {
            ExecutionContext::Hosted => {
                let _guard = HostedGuard::scoped(&self.heap, depth);
                self.inner.build_frame(context, depth, callback);
            }
            ExecutionContext::Native => self.inner.build_frame(context, depth, callback),
        }
    }
}

struct Chain {
    builder: Rc<dyn FrameBuilder>,
    continuation: Option<Box<dyn FnOnce()>>,
}

thread_local! {
    static CHAINS: RefCell<Vec<Chain>> = RefCell::new(Vec::new());
}

/// Pops the chain it pushed, on return or while unwinding
struct ChainScope {
    index: usize,
}

impl ChainScope {
    fn enter(chain: Chain) -> Self {
        let index = CHAINS.with(|chains| {
            let mut chains = chains.borrow_mut();
            chains.push(chain);
            chains.len() - 1
        });
        Self { index }
    }
}

impl Drop for ChainScope {
    fn drop(&mut self) {
        // Moved out first: dropping an unused continuation must not hold the borrow
        let stale: Vec<Chain> = CHAINS.with(|chains| {
            let mut chains = chains.borrow_mut();
            if self.index < chains.len() {
                chains.split_off(self.index)
            } else {
                Vec::new()
            }
        });
        drop(stale);
    }
}

/// Recursive frame builder
pub struct FrameAlternator {
    builder: Rc<dyn FrameBuilder>,
}

impl FrameAlternator {
    pub fn new<B: FrameBuilder + 'static>(builder: B) -> Self {
        Self {
            builder: Rc::new(builder),
        }
    }

    /// Build `depth` guarded frames, then run `continuation` in the innermost
    ///
    /// Every frame's guard is torn down before this returns, whether the
    /// continuation returns or unwinds.
    pub fn run<F>(&self, depth: usize, continuation: F)
    where
        F: FnOnce() + 'static,
    {
        let _scope = ChainScope::enter(Chain {
            builder: Rc::clone(&self.builder),
            continuation: Some(Box::new(continuation)),
        });
        build_frame(depth);
    }

    /// Contexts this alternator selects for a chain of `depth`, outermost first
    pub fn contexts(depth: usize) -> Vec<ExecutionContext> {
        ExecutionContext::sequence(depth)
    }
}

#[inline(never)]
fn build_frame(depth: usize) {
    if depth == 0 {
        let continuation = CHAINS.with(|chains| {
            chains
                .borrow_mut()
                .last_mut()
                .and_then(|chain| chain.continuation.take())
        });
        match continuation {
            Some(continuation) => continuation(),
            None => warn!("frame chain bottomed out without a continuation"),
        }
        return;
    }

    let builder = CHAINS.with(|chains| chains.borrow().last().map(|c| Rc::clone(&c.builder)));
    let Some(builder) = builder else {
        warn!(depth, "frame callback invoked outside of a running chain");
        return;
    };

    let context = ExecutionContext::for_depth(depth);
    trace!(depth, %context, "building frame");
    builder.build_frame(context, depth, descend);
}

extern "C-unwind" fn descend(depth: usize) {
    build_frame(depth.saturating_sub(1));
}
