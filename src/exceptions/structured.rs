/*!
 * Structured Exceptions
 *
 * Code-based exceptions with two-phase dispatch.
 *
 * ## Dispatch
 *
 * 1. **Search**: [`raise_exception`] walks the installed handlers from the
 *    innermost outwards and runs each filter at the raise point. Nothing has
 *    unwound yet, so every frame between the raise and the handler is still
 *    alive. The first filter to answer [`FilterDisposition::ExecuteHandler`]
 *    claims the exception.
 * 2. **Unwind**: the stack unwinds to the claiming [`try_except`], running
 *    scope cleanup on the way. Handlers that did not claim let it pass.
 *
 * A record has no typed payload. Callers that need to pass data use the
 * information words, e.g. the address and length of a message that lives in
 * the raising frame. Such addresses are only valid during the search phase.
 */

use crate::core::limits::{MAXIMUM_PARAMETERS, MESSAGE_ADDRESS_SLOT, MESSAGE_LENGTH_SLOT};
use std::cell::RefCell;
use std::fmt;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Record flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExceptionFlags(u32);

impl ExceptionFlags {
    pub const NONE: ExceptionFlags = ExceptionFlags(0);
    pub const NONCONTINUABLE: ExceptionFlags = ExceptionFlags(0x1);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: ExceptionFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

/// A raised structured exception
#[derive(Clone, PartialEq, Eq)]
pub struct ExceptionRecord {
    code: u32,
    flags: ExceptionFlags,
    parameter_count: usize,
    information: [usize; MAXIMUM_PARAMETERS],
}

impl ExceptionRecord {
    /// Build a record; arguments past [`MAXIMUM_PARAMETERS`] are dropped
    pub fn new(code: u32, flags: ExceptionFlags, arguments: &[usize]) -> Self {
        if arguments.len() > MAXIMUM_PARAMETERS {
            warn!(
                code = format_args!("{:#010x}", code),
                "dropping {} information words past the limit of {}",
                arguments.len() - MAXIMUM_PARAMETERS,
                MAXIMUM_PARAMETERS
            );
        }
        let parameter_count = arguments.len().min(MAXIMUM_PARAMETERS);
        let mut information = [0usize; MAXIMUM_PARAMETERS];
        information[..parameter_count].copy_from_slice(&arguments[..parameter_count]);
        Self {
            code,
            flags,
            parameter_count,
            information,
        }
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn flags(&self) -> ExceptionFlags {
        self.flags
    }

    /// The information words that were supplied
    pub fn information(&self) -> &[usize] {
        &self.information[..self.parameter_count]
    }
}

impl fmt::Debug for ExceptionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExceptionRecord")
            .field("code", &format_args!("{:#010x}", self.code))
            .field("flags", &format_args!("{:#x}", self.flags.bits()))
            .field("information", &self.information())
            .finish()
    }
}

/// What a filter sees during the search phase
pub struct ExceptionPointers<'a> {
    record: &'a ExceptionRecord,
}

impl<'a> ExceptionPointers<'a> {
    pub fn code(&self) -> u32 {
        self.record.code
    }

    pub fn record(&self) -> &'a ExceptionRecord {
        self.record
    }

    /// Read a message packed with [`message_information`]
    ///
    /// # Safety
    ///
    /// The address and length words must come from [`message_information`]
    /// on a string that is still alive. For records built by the emitter this
    /// holds for the whole search phase, because the string lives in the
    /// raising frame. It does not hold once the handler body runs.
    pub unsafe fn message(&self) -> Option<String> {
        let information = self.record.information();
        let address = *information.get(MESSAGE_ADDRESS_SLOT)?;
        let length = *information.get(MESSAGE_LENGTH_SLOT)?;
        if address == 0 {
            return None;
        }
        let bytes = std::slice::from_raw_parts(address as *const u8, length);
        Some(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Information words that carry `message` by address
pub fn message_information(message: &str) -> [usize; 2] {
    let mut words = [0usize; 2];
    words[MESSAGE_ADDRESS_SLOT] = message.as_ptr() as usize;
    words[MESSAGE_LENGTH_SLOT] = message.len();
    words
}

/// Filter verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDisposition {
    /// Claim the exception; its handler runs after unwinding
    ExecuteHandler,
    /// Decline; keep searching outer handlers
    ContinueSearch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HandlerToken(u64);

static NEXT_HANDLER: AtomicU64 = AtomicU64::new(1);

type Filter = Rc<dyn Fn(&ExceptionPointers<'_>) -> FilterDisposition>;

struct Registration {
    token: HandlerToken,
    filter: Filter,
}

thread_local! {
    static HANDLERS: RefCell<Vec<Registration>> = RefCell::new(Vec::new());
}

/// Keeps a handler installed for the dynamic extent of a `try_except`
struct Installed {
    token: HandlerToken,
}

impl Installed {
    fn install(filter: Filter) -> Self {
        let token = HandlerToken(NEXT_HANDLER.fetch_add(1, Ordering::Relaxed));
        HANDLERS.with(|handlers| handlers.borrow_mut().push(Registration { token, filter }));
        Self { token }
    }
}

impl Drop for Installed {
    fn drop(&mut self) {
        HANDLERS.with(|handlers| {
            let mut handlers = handlers.borrow_mut();
            if let Some(pos) = handlers.iter().rposition(|r| r.token == self.token) {
                handlers.truncate(pos);
            }
        });
    }
}

/// Unwinding payload of a structured exception
pub struct StructuredException {
    record: ExceptionRecord,
    target: Option<HandlerToken>,
}

impl StructuredException {
    pub fn record(&self) -> &ExceptionRecord {
        &self.record
    }

    pub fn into_record(self) -> ExceptionRecord {
        self.record
    }

    /// Whether a filter claimed the exception during the search phase
    pub fn is_claimed(&self) -> bool {
        self.target.is_some()
    }
}

impl fmt::Debug for StructuredException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuredException")
            .field("record", &self.record)
            .field("claimed", &self.is_claimed())
            .finish()
    }
}

/// Search phase: innermost handler first
fn search(record: &ExceptionRecord) -> Option<HandlerToken> {
    // Snapshot so filters run without the registry borrowed
    let handlers: Vec<(HandlerToken, Filter)> = HANDLERS.with(|handlers| {
        handlers
            .borrow()
            .iter()
            .rev()
            .map(|r| (r.token, Rc::clone(&r.filter)))
            .collect()
    });

    let pointers = ExceptionPointers { record };
    for (token, filter) in handlers {
        match filter(&pointers) {
            FilterDisposition::ExecuteHandler => {
                debug!(
                    code = format_args!("{:#010x}", record.code),
                    handler = token.0,
                    "structured exception claimed"
                );
                return Some(token);
            }
            FilterDisposition::ContinueSearch => {
                debug!(
                    code = format_args!("{:#010x}", record.code),
                    handler = token.0,
                    "filter declined, continuing search"
                );
            }
        }
    }
    None
}

/// Raise a structured exception
///
/// Filters run before this frame starts unwinding, so anything the
/// information words point to must stay alive in the caller until this
/// call, which never returns, is entered.
pub fn raise_exception(code: u32, flags: ExceptionFlags, arguments: &[usize]) -> ! {
    let record = ExceptionRecord::new(code, flags, arguments);
    let target = search(&record);
    if target.is_none() {
        warn!(
            code = format_args!("{:#010x}", code),
            "unhandled structured exception: no filter claimed it"
        );
    }
    resume_unwind(Box::new(StructuredException { record, target }))
}

/// Run `body` with `filter` installed as a structured handler
///
/// Returns `Err(record)` when this handler's filter claimed an exception
/// raised inside `body`. Exceptions claimed by outer handlers, unclaimed
/// ones and every other payload keep unwinding.
pub fn try_except<R, B, F>(body: B, filter: F) -> Result<R, ExceptionRecord>
where
    B: FnOnce() -> R,
    F: Fn(&ExceptionPointers<'_>) -> FilterDisposition + 'static,
{
    let installed = Installed::install(Rc::new(filter));
    let outcome = catch_unwind(AssertUnwindSafe(body));
    let token = installed.token;
    drop(installed);

    match outcome {
        Ok(value) => Ok(value),
        Err(payload) => match payload.downcast::<StructuredException>() {
            Ok(exception) if exception.target == Some(token) => Err(exception.into_record()),
            Ok(exception) => resume_unwind(exception),
            Err(other) => resume_unwind(other),
        },
    }
}
