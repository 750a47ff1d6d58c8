/*!
 * Guard Tests
 *
 * Teardown bookkeeping for native and hosted guards outside of a frame chain
 */

use pretty_assertions::assert_eq;
use unwind_harness::core::guard::*;
use unwind_harness::exceptions::{try_catch, NativeException, Throwable};
use unwind_harness::hosted::HostedHeap;
use unwind_harness::{AllocationSite, ExecutionContext};

fn phases(mark: JournalMark) -> Vec<(usize, CleanupPhase)> {
    CleanupJournal::since(mark)
        .into_iter()
        .map(|e| (e.tag, e.phase))
        .collect()
}

#[test]
fn test_nested_native_guards_unwind_innermost_first() {
    let mark = CleanupJournal::mark();
    let caught = try_catch::<NativeException, _, _>(|| {
        let _outer = NativeGuard::new(2);
        let _middle = NativeGuard::new(1);
        let _inner = NativeGuard::new(0);
        NativeException::new("boom").throw()
    });

    assert_eq!(caught.err().map(|e| e.what().to_string()), Some("boom".to_string()));
    assert_eq!(
        phases(mark),
        vec![
            (0, CleanupPhase::Destroyed),
            (1, CleanupPhase::Destroyed),
            (2, CleanupPhase::Destroyed),
        ]
    );
}

#[test]
fn test_released_guard_rejects_second_release() {
    let mut guard = NativeGuard::new(4);
    let id = guard.metadata().id;
    assert!(guard.release().is_ok());
    assert_eq!(guard.release(), Err(GuardError::AlreadyReleased(id)));
    assert!(!guard.is_active());
}

#[test]
fn test_scoped_hosted_guard_disposed_once() {
    let heap = HostedHeap::new();
    let mark = CleanupJournal::mark();
    {
        let guard = HostedGuard::scoped(&heap, 3);
        assert!(guard.is_active());
        assert_eq!(guard.metadata().context, ExecutionContext::Hosted);
    }

    // Collector sees a disposed object and skips its finalizer
    let stats = heap.collect();
    assert_eq!((stats.finalized, stats.suppressed), (0, 1));
    assert_eq!(phases(mark), vec![(3, CleanupPhase::Disposed)]);
}

#[test]
fn test_collected_hosted_guard_waits_for_collector() {
    let heap = HostedHeap::new();
    let mark = CleanupJournal::mark();

    let guard = HostedGuard::collected(&heap, 7);
    assert_eq!(guard.metadata().site, AllocationSite::Heap);
    drop(guard);
    assert!(CleanupJournal::since(mark).is_empty());

    let stats = heap.collect();
    assert_eq!(stats.finalized, 1);
    assert_eq!(phases(mark), vec![(7, CleanupPhase::Finalized)]);
}

#[test]
fn test_guard_ids_increase_with_creation() {
    let first = NativeGuard::new(0);
    let second = NativeGuard::new(0);
    assert!(second.metadata().id > first.metadata().id);
}
