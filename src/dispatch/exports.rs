/*!
 * Module Exports
 *
 * The four entry points reachable across the module boundary. They keep a
 * fixed calling convention and let exceptions unwind through them.
 */

use crate::core::types::ExceptionKind;
use crate::emitter;
use crate::frames::{FrameCallback, FrameContext, HostedFrame, NativeFrame};
use std::ffi::CStr;
use std::os::raw::c_char;

/// Decode an incoming message; invalid UTF-8 is replaced, null is empty
///
/// # Safety
///
/// `message` must be null or point to a NUL-terminated string.
unsafe fn convert_message(message: *const c_char) -> String {
    if message.is_null() {
        return String::new();
    }
    CStr::from_ptr(message).to_string_lossy().into_owned()
}

/// Raise `kind` with a stack-scoped terminal guard
///
/// # Safety
///
/// `message` must be null or point to a NUL-terminated string that stays
/// valid for the duration of the call.
#[no_mangle]
pub unsafe extern "C-unwind" fn unwind_raise_from_stack(
    kind: ExceptionKind,
    message: *const c_char,
    error_code: u32,
) {
    let message = convert_message(message);
    emitter::raise_from_stack(kind, &message, error_code)
}

/// Raise `kind` with a heap-scoped terminal guard
///
/// # Safety
///
/// Same requirements as [`unwind_raise_from_stack`].
#[no_mangle]
pub unsafe extern "C-unwind" fn unwind_raise_from_heap(
    kind: ExceptionKind,
    message: *const c_char,
    error_code: u32,
) {
    let message = convert_message(message);
    emitter::raise_from_heap(kind, &message, error_code)
}

/// Build one native frame guarded by a native guard tagged `depth`
#[no_mangle]
pub extern "C-unwind" fn unwind_build_native_frame(depth: usize, callback: FrameCallback) {
    NativeFrame::enter(depth, callback)
}

/// Build one hosted frame guarded by a scoped hosted guard tagged `depth`
#[no_mangle]
pub extern "C-unwind" fn unwind_build_hosted_frame(depth: usize, callback: FrameCallback) {
    HostedFrame::enter(depth, callback)
}
