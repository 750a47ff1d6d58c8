/*!
 * Deferred cleanup of heap-site guards
 */

use unwind_harness::core::guard::CleanupPhase;
use unwind_harness::core::limits::DEFAULT_DEPTHS;
use unwind_harness::dispatch::DispatchTable;
use unwind_harness::orchestrator::{Orchestrator, TestCase};
use unwind_harness::{AllocationSite, ExceptionKind};

#[test]
fn test_heap_guard_finalized_by_collector() {
    let orchestrator = Orchestrator::new(DispatchTable::builtin().unwrap());

    for &depth in DEFAULT_DEPTHS {
        let case = TestCase::new(ExceptionKind::Hosted, AllocationSite::Heap, depth);
        let report = orchestrator.run_case(&case).unwrap();
        assert!(report.passed(), "depth {}: {:?}", depth, report.failures);

        let stats = report.collection.expect("collection enabled by default");
        assert_eq!(stats.finalized, 1, "depth {}", depth);
        assert_eq!(stats.survivors, 0);

        let finalized: Vec<_> = report
            .events
            .iter()
            .filter(|e| e.phase == CleanupPhase::Finalized)
            .collect();
        assert_eq!(finalized.len(), 1);
        assert_eq!(finalized[0].site, AllocationSite::Heap);
        assert_eq!(finalized[0].tag, 0);
    }
}

#[test]
fn test_heap_guard_survives_until_collected() {
    let orchestrator =
        Orchestrator::new(DispatchTable::builtin().unwrap()).collect_between_cases(false);
    let case = TestCase::new(ExceptionKind::Native, AllocationSite::Heap, 3);
    orchestrator.heap().collect();

    let report = orchestrator.run_case(&case).unwrap();
    assert!(report.passed(), "{:?}", report.failures);
    assert!(report.collection.is_none());
    // Terminal guard plus the two disposed hosted frame guards
    assert_eq!(orchestrator.heap().pending_finalization(), 3);

    let stats = orchestrator.heap().collect();
    assert_eq!(stats.finalized, 1);
    assert_eq!(stats.suppressed, 2);
    assert_eq!(orchestrator.heap().pending_finalization(), 0);
}

#[test]
fn test_stack_guards_are_not_finalized() {
    let orchestrator = Orchestrator::new(DispatchTable::builtin().unwrap());
    let case = TestCase::new(ExceptionKind::Structured, AllocationSite::Stack, 5);

    let report = orchestrator.run_case(&case).unwrap();
    assert!(report.passed(), "{:?}", report.failures);
    let stats = report.collection.unwrap();
    // Disposed during unwinding; the collector only drops them
    assert_eq!(stats.finalized, 0);
    assert!(stats.suppressed > 0);
}
