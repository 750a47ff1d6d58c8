/*!
 * Hosted Context
 * Collected object heap used by hosted frames and heap-scoped guards
 */

pub mod heap;

pub use heap::{Gc, GcStats, HostedHeap, HostedObject, Scoped};
