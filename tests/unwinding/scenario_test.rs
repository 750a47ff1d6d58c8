/*!
 * End-to-end scenarios through the built-in module
 */

use pretty_assertions::assert_eq;
use unwind_harness::core::guard::{CleanupEvent, CleanupJournal, CleanupPhase};
use unwind_harness::dispatch::abi::BUILD_NATIVE_FRAME;
use unwind_harness::dispatch::{DispatchTable, ExportTable, Symbol};
use unwind_harness::frames::FrameCallback;
use unwind_harness::orchestrator::{Handler, Orchestrator, TestCase};
use unwind_harness::{AllocationSite, ExceptionKind, ExecutionContext, HarnessError};

fn orchestrator() -> Orchestrator {
    Orchestrator::new(DispatchTable::builtin().unwrap())
}

fn stack_events(events: Vec<CleanupEvent>) -> Vec<CleanupEvent> {
    events
        .into_iter()
        .filter(|e| e.site == AllocationSite::Stack)
        .collect()
}

#[test]
fn test_native_exception_from_stack_depth_nine() {
    let case = TestCase::new(ExceptionKind::Native, AllocationSite::Stack, 9)
        .with_message("Successfully caught C++ exception");

    let report = orchestrator().run_case(&case).unwrap();
    let events = stack_events(report.events.clone());

    assert!(report.passed(), "{:?}", report.failures);
    assert_eq!(report.handled_by, Some(Handler::Case));
    assert_eq!(report.message.as_deref(), Some("Successfully caught C++ exception"));
    assert_eq!(report.teardown, (0..=9).collect::<Vec<_>>());

    // Ten teardowns, newest guard first, and none left behind in the journal
    assert_eq!(events.len(), 10);
    assert!(events.windows(2).all(|pair| pair[0].id > pair[1].id));
    assert_eq!(CleanupJournal::count_since(CleanupJournal::mark()), 0);
}

#[test]
fn test_guard_contexts_alternate() {
    let case = TestCase::new(ExceptionKind::Hosted, AllocationSite::Stack, 5);

    let report = orchestrator().run_case(&case).unwrap();
    assert!(report.passed(), "{:?}", report.failures);

    for event in stack_events(report.events.clone()) {
        let (context, phase) = match event.tag {
            // Terminal guard is a stack-scoped hosted object
            0 => (ExecutionContext::Hosted, CleanupPhase::Disposed),
            tag if tag % 2 == 0 => (ExecutionContext::Native, CleanupPhase::Destroyed),
            _ => (ExecutionContext::Hosted, CleanupPhase::Disposed),
        };
        assert_eq!((event.context, event.phase), (context, phase), "tag {}", event.tag);
    }
}

#[test]
fn test_every_kind_at_depth_zero() {
    let orchestrator = orchestrator();
    for kind in ExceptionKind::ALL {
        for site in AllocationSite::ALL {
            let report = orchestrator.run_case(&TestCase::new(kind, site, 0)).unwrap();
            assert!(report.passed(), "{} from {}: {:?}", kind, site, report.failures);
            assert_eq!(report.message.as_deref(), Some(kind.default_message()));
        }
    }
}

#[test]
fn test_default_messages() {
    assert_eq!(
        ExceptionKind::Hosted.default_message(),
        "Successfully caught hosted exception"
    );
    assert_eq!(
        ExceptionKind::Structured.default_message(),
        "Successfully caught structured exception (SEH)"
    );
}

extern "C-unwind" fn swallowing_frame(depth: usize, callback: FrameCallback) {
    let _ = std::panic::catch_unwind(|| callback(depth));
}

#[test]
fn test_swallowed_exception_is_propagation_failure() {
    let module = ExportTable::builtin()
        .without(BUILD_NATIVE_FRAME)
        .export(BUILD_NATIVE_FRAME, Symbol::BuildFrame(swallowing_frame));
    let orchestrator = Orchestrator::new(DispatchTable::resolve(&module).unwrap());

    for kind in ExceptionKind::ALL {
        let case = TestCase::new(kind, AllocationSite::Stack, 3);
        match orchestrator.run_case(&case) {
            Err(HarnessError::PropagationFailure { kind: k, depth, .. }) => {
                assert_eq!((k, depth), (kind, 3));
            }
            other => panic!("expected propagation failure for {}, got {:?}", kind, other),
        }
    }
}
