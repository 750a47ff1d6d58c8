/*!
 * Test Cases
 * One cell of the matrix and what running it produced
 */

use crate::core::errors::CaseFailure;
use crate::core::limits::TEST_EXCEPTION_CODE;
use crate::core::guard::CleanupEvent;
use crate::core::types::{AllocationSite, ExceptionKind, ExecutionContext};
use crate::hosted::GcStats;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of the boundary that catches the exception
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Driver {
    /// A construct typed to the case's kind
    #[default]
    Typed,
    /// One hosted catch-all for every kind. The driver also holds a hosted
    /// guard around each hosted frame it asks the module for.
    Hosted,
}

impl Driver {
    pub const ALL: [Driver; 2] = [Driver::Typed, Driver::Hosted];
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Driver::Typed => write!(f, "typed"),
            Driver::Hosted => write!(f, "hosted"),
        }
    }
}

/// A single matrix cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub kind: ExceptionKind,
    pub site: AllocationSite,
    pub depth: usize,
    /// Control cases always run under the typed driver
    #[serde(default)]
    pub driver: Driver,
    pub error_code: u32,
    /// Code the structured filter accepts; equal to `error_code` except in
    /// control cases
    pub filter_code: u32,
    pub expected_message: String,
}

impl TestCase {
    pub fn new(kind: ExceptionKind, site: AllocationSite, depth: usize) -> Self {
        Self {
            kind,
            site,
            depth,
            driver: Driver::Typed,
            error_code: TEST_EXCEPTION_CODE,
            filter_code: TEST_EXCEPTION_CODE,
            expected_message: kind.default_message().to_string(),
        }
    }

    /// Structured case whose inner filter must decline
    ///
    /// Raised at depth 0 with `error_code`; the inner filter only accepts
    /// `error_code ^ 1`, so the exception has to reach an outer handler.
    pub fn rejected_filter(site: AllocationSite, error_code: u32) -> Self {
        Self::new(ExceptionKind::Structured, site, 0)
            .with_error_code(error_code)
            .with_filter_code(error_code ^ 1)
            .with_message("Structured exception passed over by the inner filter")
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.expected_message = message.into();
        self
    }

    /// Set the raised code; the filter follows unless set separately afterwards
    pub fn with_error_code(mut self, code: u32) -> Self {
        self.error_code = code;
        self.filter_code = code;
        self
    }

    pub fn with_driver(mut self, driver: Driver) -> Self {
        self.driver = driver;
        self
    }

    pub fn with_filter_code(mut self, code: u32) -> Self {
        self.filter_code = code;
        self
    }

    /// Whether the case expects the inner filter to decline
    pub fn is_control(&self) -> bool {
        self.kind == ExceptionKind::Structured && self.filter_code != self.error_code
    }

    /// Guard teardowns expected during unwinding, innermost first
    ///
    /// Heap-site terminal guards are left to the collector and not expected.
    /// Under the hosted driver every hosted level adds the driver's guard,
    /// torn down right after the module's.
    pub fn expected_teardown(&self) -> Vec<usize> {
        let mut tags = Vec::with_capacity(self.depth * 2 + 1);
        if self.site == AllocationSite::Stack {
            tags.push(0);
        }
        let driver_guards = self.driver == Driver::Hosted && !self.is_control();
        for tag in 1..=self.depth {
            tags.push(tag);
            if driver_guards && ExecutionContext::for_depth(tag) == ExecutionContext::Hosted {
                tags.push(tag);
            }
        }
        tags
    }

    pub fn name(&self) -> String {
        if self.is_control() {
            format!("Reject {} exception in filter", self.kind)
        } else {
            match self.driver {
                Driver::Typed => format!("Throw {} exception from {}", self.kind, self.site),
                Driver::Hosted => format!(
                    "Throw {} exception from {} to hosted driver",
                    self.kind, self.site
                ),
            }
        }
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (depth: {})", self.name(), self.depth)
    }
}

/// Handler that ended up with the exception
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handler {
    /// The construct installed for the case's kind
    Case,
    /// The catch-all around a control case
    Outer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Passed,
    Failed,
}

/// Result of running one case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseReport {
    pub case: TestCase,
    pub verdict: Verdict,
    pub handled_by: Option<Handler>,
    pub message: Option<String>,
    /// Tags of stack-site guards in teardown order
    pub teardown: Vec<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<CaseFailure>,
    /// Every teardown of the case, including collector finalizations
    #[serde(default)]
    pub events: Vec<CleanupEvent>,
    /// Collector pass run after the case, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<GcStats>,
    pub trace_id: String,
}

impl CaseReport {
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Passed
    }
}
