/*!
 * Frame Chains
 *
 * Alternating hosted/native frame construction.
 */

pub mod alternator;
pub mod context;

pub use alternator::{FrameAlternator, FrameBuilder, HostedDriverFrames, LocalFrames};
pub use context::{FrameCallback, FrameContext, HostedFrame, NativeFrame};
