/*!
 * Exception Mechanisms
 *
 * The three ways a chain can be torn down:
 *
 * - **Hosted**: [`HostedException`], thrown by the hosted runtime
 * - **Native**: [`NativeException`], a language-level exception
 * - **Structured**: an [`ExceptionRecord`] identified by a numeric code and
 *   dispatched to filters before any frame unwinds
 *
 * Hosted and native exceptions are typed and caught with [`try_catch`], or
 * together with [`try_catch_hosted`], which sees native ones as hosted.
 * Structured exceptions are caught with [`try_except`].
 */

mod catch;
mod hosted;
mod native;
pub mod structured;

pub use catch::{describe_payload, into_hosted, is_harness_exception, try_catch, try_catch_hosted};
pub use hosted::HostedException;
pub use native::NativeException;
pub use structured::{
    raise_exception, try_except, ExceptionFlags, ExceptionPointers, ExceptionRecord,
    FilterDisposition, StructuredException,
};

use std::any::Any;

/// Typed exception payload
pub trait Throwable: Any + Send + Sized {
    /// Message carried by the exception
    fn message(&self) -> &str;

    /// Start unwinding with this exception as the payload
    ///
    /// Bypasses the panic hook: raising is the expected outcome here, not a bug.
    fn throw(self) -> ! {
        std::panic::resume_unwind(Box::new(self))
    }
}
