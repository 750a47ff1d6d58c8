/*!
 * Exception Emitter
 *
 * Terminal operation of a frame chain: builds one more guard at the requested
 * site and raises the requested kind of exception. Never returns.
 */

use crate::core::guard::HostedGuard;
use crate::core::limits::TERMINAL_GUARD_TAG;
use crate::core::types::{AllocationSite, ExceptionKind};
use crate::exceptions::structured::message_information;
use crate::exceptions::{
    raise_exception, ExceptionFlags, HostedException, NativeException, Throwable,
};
use crate::hosted::HostedHeap;
use tracing::debug;

/// Raise `kind` with a terminal guard at `site`
pub fn raise(kind: ExceptionKind, site: AllocationSite, message: &str, error_code: u32) -> ! {
    match site {
        AllocationSite::Stack => raise_from_stack(kind, message, error_code),
        AllocationSite::Heap => raise_from_heap(kind, message, error_code),
    }
}

/// Raise with a stack-scoped terminal guard, disposed while unwinding
#[inline(never)]
pub fn raise_from_stack(kind: ExceptionKind, message: &str, error_code: u32) -> ! {
    let _guard = HostedGuard::scoped(&HostedHeap::current(), TERMINAL_GUARD_TAG);
    throw(kind, message, error_code)
}

/// Raise with a heap-scoped terminal guard, left to the collector
#[inline(never)]
pub fn raise_from_heap(kind: ExceptionKind, message: &str, error_code: u32) -> ! {
    let _guard = HostedGuard::collected(&HostedHeap::current(), TERMINAL_GUARD_TAG);
    throw(kind, message, error_code)
}

#[inline(never)]
fn throw(kind: ExceptionKind, message: &str, error_code: u32) -> ! {
    debug!(%kind, "raising");
    match kind {
        ExceptionKind::Hosted => HostedException::new(message).throw(),
        ExceptionKind::Native => NativeException::new(message).throw(),
        ExceptionKind::Structured => {
            // Filters read this through the information words; it must stay
            // in this frame until the search phase is over.
            let message = message.to_owned();
            let information = message_information(&message);
            raise_exception(error_code, ExceptionFlags::NONE, &information)
        }
    }
}
