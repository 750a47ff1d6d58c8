/*!
 * Structured exception scenarios
 */

use pretty_assertions::assert_eq;
use unwind_harness::core::limits::TEST_EXCEPTION_CODE;
use unwind_harness::dispatch::DispatchTable;
use unwind_harness::exceptions::{raise_exception, try_except, ExceptionFlags, FilterDisposition};
use unwind_harness::orchestrator::{Handler, Orchestrator, TestCase};
use unwind_harness::{AllocationSite, ExceptionKind};

fn orchestrator() -> Orchestrator {
    Orchestrator::new(DispatchTable::builtin().unwrap())
}

#[test]
fn test_structured_from_heap_depth_eleven() {
    let case = TestCase::new(ExceptionKind::Structured, AllocationSite::Heap, 11)
        .with_error_code(0xE000_1111);
    let report = orchestrator().run_case(&case).unwrap();

    assert!(report.passed(), "{:?}", report.failures);
    assert_eq!(
        report.message.as_deref(),
        Some("Successfully caught structured exception (SEH)")
    );
    // Terminal heap guard is left for the collector
    assert_eq!(report.teardown, (1..=11).collect::<Vec<_>>());
}

#[test]
fn test_custom_code_reaches_filter() {
    let case = TestCase::new(ExceptionKind::Structured, AllocationSite::Stack, 4)
        .with_error_code(0xE000_2222)
        .with_message("custom code");
    let report = orchestrator().run_case(&case).unwrap();
    assert!(report.passed(), "{:?}", report.failures);
    assert_eq!(report.message.as_deref(), Some("custom code"));
}

#[test]
fn test_rejected_filter_falls_through_to_outer_handler() {
    let orchestrator = orchestrator();
    for site in AllocationSite::ALL {
        let case = TestCase::rejected_filter(site, TEST_EXCEPTION_CODE);
        let report = orchestrator.run_case(&case).unwrap();
        assert!(report.passed(), "{}: {:?}", site, report.failures);
        assert_eq!(report.handled_by, Some(Handler::Outer));
        assert_eq!(report.message.as_deref(), Some(case.expected_message.as_str()));
    }
}

#[test]
fn test_nested_handlers_innermost_claims() {
    let result = try_except(
        || {
            try_except(
                || {
                    raise_exception(7, ExceptionFlags::NONE, &[]);
                },
                |_| FilterDisposition::ExecuteHandler,
            )
        },
        |_| FilterDisposition::ExecuteHandler,
    );
    let inner = result.expect("outer handler should not run");
    assert_eq!(inner.unwrap_err().code(), 7);
}

#[test]
fn test_filter_sees_live_frames() {
    let case = TestCase::new(ExceptionKind::Structured, AllocationSite::Stack, 6);
    let report = orchestrator().run_case(&case).unwrap();
    // FilterOrdering would be reported if any guard was gone before the filter ran
    assert!(report.failures.is_empty(), "{:?}", report.failures);
    assert_eq!(report.teardown, (0..=6).collect::<Vec<_>>());
}
