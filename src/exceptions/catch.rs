/*!
 * Typed Catch
 */

use super::{HostedException, NativeException, StructuredException};
use std::any::{Any, TypeId};
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};

/// Run `body`, catching only exceptions of type `E`
///
/// Any other payload keeps unwinding untouched.
pub fn try_catch<E, R, F>(body: F) -> Result<R, E>
where
    E: Any + Send,
    F: FnOnce() -> R,
{
    match catch_unwind(AssertUnwindSafe(body)) {
        Ok(value) => Ok(value),
        Err(payload) => match payload.downcast::<E>() {
            Ok(exception) => Err(*exception),
            Err(other) => resume_unwind(other),
        },
    }
}

/// Run `body` in a hosted catch-all
///
/// Hosted exceptions are caught as they are; native ones are translated to a
/// hosted exception carrying the same message. Structured exceptions need a
/// filter and keep unwinding, as does anything else.
pub fn try_catch_hosted<R, F>(body: F) -> Result<R, HostedException>
where
    F: FnOnce() -> R,
{
    match catch_unwind(AssertUnwindSafe(body)) {
        Ok(value) => Ok(value),
        Err(payload) => match into_hosted(payload) {
            Ok(exception) => Err(exception),
            Err(other) => resume_unwind(other),
        },
    }
}

/// Translate a payload to the hosted exception a hosted catch-all would see
pub fn into_hosted(payload: Box<dyn Any + Send>) -> Result<HostedException, Box<dyn Any + Send>> {
    let payload = match payload.downcast::<HostedException>() {
        Ok(exception) => return Ok(*exception),
        Err(other) => other,
    };
    match payload.downcast::<NativeException>() {
        Ok(exception) => Ok(HostedException::from(*exception)),
        Err(other) => Err(other),
    }
}

/// Human-readable description of an arbitrary unwinding payload
pub fn describe_payload(payload: &(dyn Any + Send)) -> String {
    if let Some(e) = payload.downcast_ref::<HostedException>() {
        format!("hosted exception: {}", e)
    } else if let Some(e) = payload.downcast_ref::<NativeException>() {
        format!("native exception: {}", e)
    } else if let Some(e) = payload.downcast_ref::<StructuredException>() {
        format!("structured exception: code {:#010x}", e.record().code())
    } else if let Some(s) = payload.downcast_ref::<&'static str>() {
        format!("panic: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic: {}", s)
    } else {
        format!("unknown payload {:?}", payload.type_id())
    }
}

/// Check whether a payload is one of the harness exception types
pub fn is_harness_exception(payload: &(dyn Any + Send)) -> bool {
    let id = payload.type_id();
    id == TypeId::of::<HostedException>()
        || id == TypeId::of::<NativeException>()
        || id == TypeId::of::<StructuredException>()
}
