/*!
 * Cleanup Journal
 *
 * Per-thread record of guard teardowns. Events are appended as guards go
 * away and drained by whoever took the mark.
 */

use super::GuardId;
use crate::core::types::{AllocationSite, ExecutionContext};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use tracing::info;

/// How a guard was torn down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupPhase {
    /// Native scope exit
    Destroyed,
    /// Eager hosted cleanup (scope exit of a stack-scoped hosted object)
    Disposed,
    /// Deferred hosted cleanup run by the collector
    Finalized,
}

/// A single teardown observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupEvent {
    pub id: GuardId,
    pub tag: usize,
    pub site: AllocationSite,
    pub context: ExecutionContext,
    pub phase: CleanupPhase,
}

/// Position in the journal, taken before a case runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JournalMark(usize);

thread_local! {
    static JOURNAL: RefCell<Vec<CleanupEvent>> = RefCell::new(Vec::new());
}

/// Accessors for the current thread's journal
pub struct CleanupJournal;

impl CleanupJournal {
    /// Append an event
    ///
    /// Called from `Drop` while unwinding, so it must not panic.
    pub fn record(event: CleanupEvent) {
        info!(
            id = event.id.raw(),
            tag = event.tag,
            site = %event.site,
            context = %event.context,
            phase = ?event.phase,
            "--- {:4} - {:?}",
            event.tag,
            event.phase
        );
        JOURNAL.with(|journal| journal.borrow_mut().push(event));
    }

    /// Current end of the journal
    pub fn mark() -> JournalMark {
        JournalMark(Self::len())
    }

    /// Events recorded after `mark`
    pub fn since(mark: JournalMark) -> Vec<CleanupEvent> {
        JOURNAL.with(|journal| {
            let journal = journal.borrow();
            journal.get(mark.0..).map(<[_]>::to_vec).unwrap_or_default()
        })
    }

    /// Number of events recorded after `mark`
    pub fn count_since(mark: JournalMark) -> usize {
        Self::len().saturating_sub(mark.0)
    }

    pub fn len() -> usize {
        JOURNAL.with(|journal| journal.borrow().len())
    }

    /// Remove and return the events recorded after `mark`
    ///
    /// The journal ends at `mark` afterwards, so the mark can be reused.
    pub fn drain_since(mark: JournalMark) -> Vec<CleanupEvent> {
        JOURNAL.with(|journal| {
            let mut journal = journal.borrow_mut();
            if mark.0 < journal.len() {
                journal.split_off(mark.0)
            } else {
                Vec::new()
            }
        })
    }

    /// Drop every recorded event
    ///
    /// Marks taken earlier become stale; take a fresh one afterwards.
    pub fn clear() {
        JOURNAL.with(|journal| journal.borrow_mut().clear());
    }
}
