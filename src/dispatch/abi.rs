/*!
 * Export ABI
 * Names and signatures of the module's entry points
 */

use crate::core::types::ExceptionKind;
use crate::frames::FrameCallback;
use std::fmt;
use std::os::raw::c_char;

/// Raise entry point: kind, NUL-terminated message, error code
pub type RaiseFn = unsafe extern "C-unwind" fn(ExceptionKind, *const c_char, u32);

/// Frame primitive: depth, callback
pub type BuildFrameFn = extern "C-unwind" fn(usize, FrameCallback);

pub const RAISE_FROM_STACK: &str = "unwind_raise_from_stack";
pub const RAISE_FROM_HEAP: &str = "unwind_raise_from_heap";
pub const BUILD_NATIVE_FRAME: &str = "unwind_build_native_frame";
pub const BUILD_HOSTED_FRAME: &str = "unwind_build_hosted_frame";

/// Every symbol a module must export
pub const REQUIRED_EXPORTS: [&str; 4] = [
    RAISE_FROM_STACK,
    RAISE_FROM_HEAP,
    BUILD_NATIVE_FRAME,
    BUILD_HOSTED_FRAME,
];

/// A resolved export, tagged with its signature class
#[derive(Clone, Copy)]
pub enum Symbol {
    Raise(RaiseFn),
    BuildFrame(BuildFrameFn),
}

impl Symbol {
    pub fn signature(&self) -> &'static str {
        match self {
            Symbol::Raise(_) => "raise",
            Symbol::BuildFrame(_) => "build_frame",
        }
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Raise(func) => write!(f, "Raise({:p})", *func as *const ()),
            Symbol::BuildFrame(func) => write!(f, "BuildFrame({:p})", *func as *const ()),
        }
    }
}
