/*!
 * Every kind caught by one hosted catch-all
 */

use pretty_assertions::assert_eq;
use unwind_harness::core::guard::CleanupPhase;
use unwind_harness::dispatch::DispatchTable;
use unwind_harness::orchestrator::{Driver, Handler, Orchestrator, TestCase};
use unwind_harness::{AllocationSite, ExceptionKind, ExecutionContext};

fn run(kind: ExceptionKind, site: AllocationSite, depth: usize) -> TestCase {
    let orchestrator = Orchestrator::new(DispatchTable::builtin().unwrap());
    let case = TestCase::new(kind, site, depth).with_driver(Driver::Hosted);
    let report = orchestrator.run_case(&case).unwrap();

    assert!(report.passed(), "{}: {:?}", case, report.failures);
    assert_eq!(report.handled_by, Some(Handler::Case));
    assert_eq!(report.message.as_deref(), Some(kind.default_message()));
    assert_eq!(report.teardown, case.expected_teardown());
    case
}

#[test]
fn test_hosted_exception_reaches_hosted_driver() {
    for site in AllocationSite::ALL {
        run(ExceptionKind::Hosted, site, 5);
    }
}

#[test]
fn test_native_exception_translated_for_hosted_driver() {
    for site in AllocationSite::ALL {
        run(ExceptionKind::Native, site, 9);
    }
}

#[test]
fn test_structured_exception_translated_for_hosted_driver() {
    for site in AllocationSite::ALL {
        run(ExceptionKind::Structured, site, 3);
    }
}

#[test]
fn test_native_message_survives_translation() {
    let orchestrator = Orchestrator::new(DispatchTable::builtin().unwrap());
    let case = TestCase::new(ExceptionKind::Native, AllocationSite::Stack, 2)
        .with_driver(Driver::Hosted)
        .with_message("thrown natively, caught as hosted");

    let report = orchestrator.run_case(&case).unwrap();
    assert!(report.passed(), "{:?}", report.failures);
    assert_eq!(report.message.as_deref(), Some("thrown natively, caught as hosted"));
}

#[test]
fn test_driver_guards_follow_module_guards() {
    let orchestrator = Orchestrator::new(DispatchTable::builtin().unwrap());
    let case = TestCase::new(ExceptionKind::Structured, AllocationSite::Stack, 4)
        .with_driver(Driver::Hosted);
    let report = orchestrator.run_case(&case).unwrap();

    assert_eq!(report.teardown, vec![0, 1, 1, 2, 3, 3, 4]);
    let hosted: Vec<_> = report
        .events
        .iter()
        .filter(|e| e.tag % 2 == 1)
        .map(|e| (e.tag, e.context, e.phase))
        .collect();
    assert_eq!(
        hosted,
        vec![
            (1, ExecutionContext::Hosted, CleanupPhase::Disposed),
            (1, ExecutionContext::Hosted, CleanupPhase::Disposed),
            (3, ExecutionContext::Hosted, CleanupPhase::Disposed),
            (3, ExecutionContext::Hosted, CleanupPhase::Disposed),
        ]
    );
}
