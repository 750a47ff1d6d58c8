/*!
 * Test Matrix
 * {driver} x {kind} x {site} x {depth}, plus the filter control cases
 */

use super::case::{Driver, TestCase};
use crate::core::limits::{DEFAULT_DEPTHS, TEST_EXCEPTION_CODE};
use crate::core::types::{AllocationSite, ExceptionKind};

/// Ordered list of cases to run
#[derive(Debug, Clone, Default)]
pub struct TestMatrix {
    cases: Vec<TestCase>,
}

impl TestMatrix {
    pub fn builder() -> MatrixBuilder {
        MatrixBuilder::default()
    }

    /// Every kind and site at the default depths, with control cases
    pub fn full() -> Self {
        Self::builder().build()
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn push(&mut self, case: TestCase) {
        self.cases.push(case);
    }
}

impl IntoIterator for TestMatrix {
    type Item = TestCase;
    type IntoIter = std::vec::IntoIter<TestCase>;

    fn into_iter(self) -> Self::IntoIter {
        self.cases.into_iter()
    }
}

impl<'a> IntoIterator for &'a TestMatrix {
    type Item = &'a TestCase;
    type IntoIter = std::slice::Iter<'a, TestCase>;

    fn into_iter(self) -> Self::IntoIter {
        self.cases.iter()
    }
}

/// Builder for [`TestMatrix`]
#[derive(Debug, Clone)]
pub struct MatrixBuilder {
    drivers: Vec<Driver>,
    kinds: Vec<ExceptionKind>,
    sites: Vec<AllocationSite>,
    depths: Vec<usize>,
    error_code: u32,
    control_cases: bool,
}

impl Default for MatrixBuilder {
    fn default() -> Self {
        Self {
            drivers: Driver::ALL.to_vec(),
            kinds: ExceptionKind::ALL.to_vec(),
            sites: AllocationSite::ALL.to_vec(),
            depths: DEFAULT_DEPTHS.to_vec(),
            error_code: TEST_EXCEPTION_CODE,
            control_cases: true,
        }
    }
}

impl MatrixBuilder {
    pub fn drivers(mut self, drivers: impl IntoIterator<Item = Driver>) -> Self {
        self.drivers = drivers.into_iter().collect();
        self
    }

    pub fn kinds(mut self, kinds: impl IntoIterator<Item = ExceptionKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }

    pub fn sites(mut self, sites: impl IntoIterator<Item = AllocationSite>) -> Self {
        self.sites = sites.into_iter().collect();
        self
    }

    pub fn depths(mut self, depths: impl IntoIterator<Item = usize>) -> Self {
        self.depths = depths.into_iter().collect();
        self
    }

    pub fn error_code(mut self, code: u32) -> Self {
        self.error_code = code;
        self
    }

    /// Add one rejected-filter control case per site when structured
    /// exceptions are in the matrix
    pub fn control_cases(mut self, enabled: bool) -> Self {
        self.control_cases = enabled;
        self
    }

    pub fn build(self) -> TestMatrix {
        let mut matrix = TestMatrix::default();
        for &driver in &self.drivers {
            for &kind in &self.kinds {
                for &site in &self.sites {
                    for &depth in &self.depths {
                        matrix.push(
                            TestCase::new(kind, site, depth)
                                .with_driver(driver)
                                .with_error_code(self.error_code),
                        );
                    }
                }
            }
        }

        if self.control_cases && self.kinds.contains(&ExceptionKind::Structured) {
            for &site in &self.sites {
                matrix.push(TestCase::rejected_filter(site, self.error_code));
            }
        }
        matrix
    }
}
