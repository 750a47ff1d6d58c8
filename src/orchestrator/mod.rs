/*!
 * Orchestrator
 * Builds the case matrix, runs it, and reports
 */

pub mod case;
pub mod matrix;
pub mod report;
pub mod runner;

pub use case::{CaseReport, Driver, Handler, TestCase, Verdict};
pub use matrix::{MatrixBuilder, TestMatrix};
pub use report::MatrixReport;
pub use runner::Orchestrator;
