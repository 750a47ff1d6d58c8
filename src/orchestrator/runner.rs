/*!
 * Orchestrator
 *
 * Runs each case inside the handling construct for its kind and checks what
 * came back: one exception, the literal message, and stack guards torn down
 * in reverse creation order before the handler returned.
 */

use super::case::{CaseReport, Driver, Handler, TestCase, Verdict};
use super::matrix::TestMatrix;
use super::report::MatrixReport;
use crate::core::errors::{CaseFailure, HarnessError, HarnessResult};
use crate::core::guard::{CleanupEvent, CleanupJournal, JournalMark};
use crate::core::types::{AllocationSite, ExceptionKind};
use crate::dispatch::DispatchTable;
use crate::exceptions::{
    describe_payload, is_harness_exception, try_catch, try_catch_hosted, try_except,
    ExceptionPointers, FilterDisposition, HostedException, NativeException, Throwable,
};
use crate::frames::{FrameAlternator, HostedDriverFrames};
use crate::hosted::HostedHeap;
use crate::monitoring::CaseSpan;
use std::cell::RefCell;
use std::ffi::CString;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// What a structured filter saw during the search phase
#[derive(Debug, Default)]
struct Sighting {
    message: Option<String>,
    /// Guards of this case already torn down when the filter claimed
    torn_down: Option<usize>,
    declined: usize,
}

type SharedSighting = Rc<RefCell<Sighting>>;

/// What the handling construct produced
#[derive(Debug, Default)]
struct Observation {
    handled_by: Option<Handler>,
    message: Option<String>,
    torn_down_before_filter: Option<usize>,
    failures: Vec<CaseFailure>,
}

impl Observation {
    fn handled(handler: Handler, message: &str) -> Self {
        Self {
            handled_by: Some(handler),
            message: Some(message.to_string()),
            ..Self::default()
        }
    }

    fn from_sighting(handler: Handler, sighting: Sighting) -> Self {
        Self {
            handled_by: Some(handler),
            message: sighting.message,
            torn_down_before_filter: sighting.torn_down,
            failures: Vec::new(),
        }
    }

    fn escaped(description: String) -> Self {
        Self {
            failures: vec![CaseFailure::UnexpectedDisposition(format!(
                "exception escaped its handler: {}",
                description
            ))],
            ..Self::default()
        }
    }
}

/// Drives cases through a resolved dispatch table
///
/// Must run on the thread that created it: the frame primitives allocate from
/// that thread's hosted heap.
pub struct Orchestrator {
    dispatch: DispatchTable,
    alternator: FrameAlternator,
    /// Chains whose hosted frames also carry a driver-side guard
    hosted_alternator: FrameAlternator,
    heap: Arc<HostedHeap>,
    collect_between_cases: bool,
}

impl Orchestrator {
    pub fn new(dispatch: DispatchTable) -> Self {
        let heap = HostedHeap::current();
        Self {
            alternator: FrameAlternator::new(dispatch.clone()),
            hosted_alternator: FrameAlternator::new(HostedDriverFrames::new(
                dispatch.clone(),
                Arc::clone(&heap),
            )),
            dispatch,
            heap,
            collect_between_cases: true,
        }
    }

    /// Run the hosted collector after every case
    pub fn collect_between_cases(mut self, enabled: bool) -> Self {
        self.collect_between_cases = enabled;
        self
    }

    pub fn heap(&self) -> &Arc<HostedHeap> {
        &self.heap
    }

    /// Run every case in order
    ///
    /// Stops at the first propagation failure; ordinary case failures are
    /// recorded and the run continues.
    pub fn run_matrix(&self, matrix: &TestMatrix) -> HarnessResult<MatrixReport> {
        let mut report = MatrixReport::new(self.dispatch.module());
        for case in matrix {
            report.push(self.run_case(case)?);
        }
        report.final_collection = Some(self.heap.collect());
        report.log_summary();
        Ok(report)
    }

    /// Run one case
    pub fn run_case(&self, case: &TestCase) -> HarnessResult<CaseReport> {
        let span = CaseSpan::new(case);
        let _entered = span.enter();
        info!("=== Running {}", case);

        let mark = CleanupJournal::mark();
        let observed = catch_unwind(AssertUnwindSafe(|| self.observe(case, mark)));
        let observation = match observed {
            Ok(Ok(observation)) => observation,
            Ok(Err(e)) => {
                CleanupJournal::drain_since(mark);
                return Err(e);
            }
            // A plain panic is a bug in the harness, not a case outcome
            Err(payload) if !is_harness_exception(payload.as_ref()) => resume_unwind(payload),
            Err(payload) => Observation::escaped(describe_payload(payload.as_ref())),
        };

        // Collection only adds heap-site events, which validation skips
        let collection = self.collect_between_cases.then(|| self.heap.collect());
        let events = CleanupJournal::drain_since(mark);
        let (teardown, failures) = validate(case, &observation, &events);

        let verdict = if failures.is_empty() {
            Verdict::Passed
        } else {
            Verdict::Failed
        };
        span.record_result(verdict == Verdict::Passed);
        match verdict {
            Verdict::Passed => info!(teardown = ?teardown, "passed"),
            Verdict::Failed => {
                for failure in &failures {
                    error!("{}", failure);
                }
            }
        }

        Ok(CaseReport {
            case: case.clone(),
            verdict,
            handled_by: observation.handled_by,
            message: observation.message,
            teardown,
            failures,
            events,
            collection,
            trace_id: span.trace_id().to_string(),
        })
    }

    fn observe(&self, case: &TestCase, mark: JournalMark) -> HarnessResult<Observation> {
        // Control cases need a filter that can decline, whatever the driver
        if case.is_control() {
            return self.catch_control(case, mark);
        }
        match (case.driver, case.kind) {
            (Driver::Hosted, _) => self.catch_hosted(case, mark),
            (Driver::Typed, ExceptionKind::Hosted) => self.catch_typed::<HostedException>(case),
            (Driver::Typed, ExceptionKind::Native) => self.catch_typed::<NativeException>(case),
            (Driver::Typed, ExceptionKind::Structured) => self.catch_structured(case, mark),
        }
    }

    /// Body of a case: build the chain, raise through the dispatch table
    fn chain(&self, case: &TestCase) -> HarnessResult<impl FnOnce() + '_> {
        let message = CString::new(case.expected_message.as_str()).map_err(|_| {
            HarnessError::Config(format!("message of case {} contains a NUL byte", case))
        })?;
        let dispatch = self.dispatch.clone();
        let (kind, site, depth, code) = (case.kind, case.site, case.depth, case.error_code);
        let alternator = match case.driver {
            Driver::Hosted if !case.is_control() => &self.hosted_alternator,
            _ => &self.alternator,
        };

        Ok(move || alternator.run(depth, move || dispatch.raise(site, kind, &message, code)))
    }

    fn catch_typed<E: Throwable>(&self, case: &TestCase) -> HarnessResult<Observation> {
        let body = self.chain(case)?;
        match try_catch::<E, _, _>(body) {
            Ok(()) => Err(propagation_failure(case)),
            Err(exception) => {
                info!("{}", exception.message());
                Ok(Observation::handled(Handler::Case, exception.message()))
            }
        }
    }

    fn catch_structured(&self, case: &TestCase, mark: JournalMark) -> HarnessResult<Observation> {
        let sighting = SharedSighting::default();
        let filter = message_filter(Some(case.filter_code), mark, Rc::clone(&sighting));
        let body = self.chain(case)?;

        match try_except(body, filter) {
            Ok(()) => Err(propagation_failure(case)),
            Err(record) => {
                debug!(code = format_args!("{:#010x}", record.code()), "handler ran");
                Ok(Observation::from_sighting(Handler::Case, sighting.take()))
            }
        }
    }

    /// One hosted catch-all for every kind
    ///
    /// Native exceptions arrive translated to hosted ones. Structured
    /// exceptions are claimed by a filter accepting any code and surface as a
    /// hosted exception carrying the message read during the search.
    fn catch_hosted(&self, case: &TestCase, mark: JournalMark) -> HarnessResult<Observation> {
        let sighting = SharedSighting::default();
        let filter = message_filter(None, mark, Rc::clone(&sighting));
        let body = self.chain(case)?;

        let exception = match try_except(|| try_catch_hosted(body), filter) {
            Ok(Ok(())) => return Err(propagation_failure(case)),
            Ok(Err(exception)) => exception,
            Err(record) => match sighting.borrow_mut().message.take() {
                Some(message) => HostedException::new(message),
                None => HostedException::new(format!(
                    "structured exception {:#010x} without a message",
                    record.code()
                )),
            },
        };
        info!("{}", exception.message());

        let mut observation = Observation::handled(Handler::Case, exception.message());
        observation.torn_down_before_filter = sighting.borrow().torn_down;
        Ok(observation)
    }

    /// Control case: the inner filter must decline and the outer one claim
    fn catch_control(&self, case: &TestCase, mark: JournalMark) -> HarnessResult<Observation> {
        let inner = SharedSighting::default();
        let outer = SharedSighting::default();
        let inner_filter = message_filter(Some(case.filter_code), mark, Rc::clone(&inner));
        let outer_filter = message_filter(Some(case.error_code), mark, Rc::clone(&outer));
        let body = self.chain(case)?;

        match try_except(|| try_except(body, inner_filter), outer_filter) {
            Ok(Ok(())) => Err(propagation_failure(case)),
            Ok(Err(record)) => {
                let mut observation = Observation::from_sighting(Handler::Case, inner.take());
                observation
                    .failures
                    .push(CaseFailure::UnexpectedDisposition(format!(
                        "filter accepting {:#010x} claimed code {:#010x}",
                        case.filter_code,
                        record.code()
                    )));
                Ok(observation)
            }
            Err(_) => {
                let declined = inner.borrow().declined;
                let mut observation = Observation::from_sighting(Handler::Outer, outer.take());
                if declined == 0 {
                    observation.failures.push(CaseFailure::UnexpectedDisposition(
                        "inner filter never saw the exception".to_string(),
                    ));
                }
                Ok(observation)
            }
        }
    }
}

/// Filter accepting `accepts`, or any code when `None`; reads the message out
/// of the information words
fn message_filter(
    accepts: Option<u32>,
    mark: JournalMark,
    sighting: SharedSighting,
) -> impl Fn(&ExceptionPointers<'_>) -> FilterDisposition + 'static {
    move |pointers| {
        if accepts.map_or(false, |code| code != pointers.code()) {
            debug!(
                code = format_args!("{:#010x}", pointers.code()),
                accepts = ?accepts,
                "filter declined"
            );
            sighting.borrow_mut().declined += 1;
            return FilterDisposition::ContinueSearch;
        }

        // SAFETY: the emitter keeps the message in the raising frame, which is
        // still on the stack while filters run.
        let message = unsafe { pointers.message() };
        if let Some(message) = &message {
            info!("{}", message);
        }

        let mut sighting = sighting.borrow_mut();
        sighting.message = message;
        sighting.torn_down = Some(CleanupJournal::count_since(mark));
        FilterDisposition::ExecuteHandler
    }
}

fn propagation_failure(case: &TestCase) -> HarnessError {
    error!("Failed to throw exception: {}", case);
    HarnessError::PropagationFailure {
        kind: case.kind,
        site: case.site,
        depth: case.depth,
    }
}

/// Check an observation against the case; returns the stack teardown tags
fn validate(
    case: &TestCase,
    observation: &Observation,
    events: &[CleanupEvent],
) -> (Vec<usize>, Vec<CaseFailure>) {
    let mut failures = observation.failures.clone();

    // Heap-site events only come from the collector and are never asserted
    let stack: Vec<&CleanupEvent> = events
        .iter()
        .filter(|e| e.site == AllocationSite::Stack)
        .collect();
    let teardown: Vec<usize> = stack.iter().map(|e| e.tag).collect();
    let reverse_creation = stack.windows(2).all(|pair| pair[0].id > pair[1].id);

    let expected = case.expected_teardown();
    if teardown != expected || !reverse_creation {
        failures.push(CaseFailure::CleanupOrder {
            expected,
            observed: teardown.clone(),
        });
    }

    if observation.handled_by.is_some() {
        let actual = observation.message.clone().unwrap_or_default();
        if actual != case.expected_message {
            failures.push(CaseFailure::PayloadCorruption {
                expected: case.expected_message.clone(),
                actual,
            });
        }
    }

    if let Some(torn_down) = observation.torn_down_before_filter {
        if torn_down > 0 {
            warn!(torn_down, "filter ran after unwinding started");
            failures.push(CaseFailure::FilterOrdering { torn_down });
        }
    }

    (teardown, failures)
}
