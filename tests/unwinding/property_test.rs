/*!
 * Property tests for frame parity and teardown order
 */

use proptest::prelude::*;
use proptest::sample::select;
use unwind_harness::dispatch::DispatchTable;
use unwind_harness::frames::FrameAlternator;
use unwind_harness::orchestrator::{Driver, Orchestrator, TestCase};
use unwind_harness::{AllocationSite, ExceptionKind, ExecutionContext};

proptest! {
    #[test]
    fn prop_contexts_alternate(depth in 0usize..64) {
        let contexts = FrameAlternator::contexts(depth);
        prop_assert_eq!(contexts.len(), depth);
        prop_assert!(contexts.windows(2).all(|pair| pair[0] != pair[1]));
        if depth > 0 {
            // Frame nearest the raise is always hosted
            prop_assert_eq!(contexts[depth - 1], ExecutionContext::Hosted);
        }
        prop_assert_eq!(contexts, FrameAlternator::contexts(depth));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_teardown_is_reverse_of_construction(
        kind in select(ExceptionKind::ALL.to_vec()),
        site in select(AllocationSite::ALL.to_vec()),
        driver in select(Driver::ALL.to_vec()),
        depth in 0usize..24,
    ) {
        let orchestrator = Orchestrator::new(DispatchTable::builtin().unwrap());
        let case = TestCase::new(kind, site, depth).with_driver(driver);
        let report = orchestrator.run_case(&case).unwrap();

        prop_assert!(report.passed(), "{}: {:?}", case, report.failures);
        prop_assert_eq!(report.teardown, case.expected_teardown());
    }
}
