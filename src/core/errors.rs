/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use crate::core::types::{AllocationSite, ExceptionKind};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Common result type for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Result type for module resolution
pub type SetupResult<T> = Result<T, SetupError>;

/// Module or symbol resolution errors
///
/// Always fatal: no case runs once one of these surfaces.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum SetupError {
    #[error("Failed to load module {}", path.display())]
    #[diagnostic(
        code(setup::module_not_found),
        help("No module is registered at this path. Check HARNESS_MODULE.")
    )]
    ModuleNotFound { path: PathBuf },

    #[error("Module {module} does not export {symbol}")]
    #[diagnostic(
        code(setup::missing_symbol),
        help("The module must export all four frame and raise entry points.")
    )]
    MissingSymbol { module: String, symbol: &'static str },

    #[error("Export {symbol} of module {module} has the wrong signature")]
    #[diagnostic(
        code(setup::signature_mismatch),
        help("Raise entry points and frame primitives are not interchangeable.")
    )]
    SignatureMismatch { module: String, symbol: &'static str },
}

/// Harness-level errors
#[derive(Error, Debug, Diagnostic)]
pub enum HarnessError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Setup(#[from] SetupError),

    #[error("Failed to throw exception: {kind} exception from {site} guard at depth {depth} never reached the handler")]
    #[diagnostic(
        code(harness::propagation_failure),
        help("An intermediate frame swallowed the exception or the chain returned normally.")
    )]
    PropagationFailure {
        kind: ExceptionKind,
        site: AllocationSite,
        depth: usize,
    },

    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(harness::config), help("Check the HARNESS_* environment variables."))]
    Config(String),

    #[error("Failed to write report: {0}")]
    #[diagnostic(code(harness::report))]
    Report(#[from] std::io::Error),

    #[error("Failed to encode report: {0}")]
    #[diagnostic(code(harness::report_encoding))]
    ReportEncoding(#[from] serde_json::Error),
}

/// Reasons a single matrix cell fails without stopping the run
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "failure", content = "details", rename_all = "snake_case")]
pub enum CaseFailure {
    #[error("Payload corrupted: expected {expected:?}, caught {actual:?}")]
    #[diagnostic(
        code(case::payload_corruption),
        help("The message was mutated or misrouted between the raise and the handler.")
    )]
    PayloadCorruption { expected: String, actual: String },

    #[error("Cleanup order violated: expected tags {expected:?}, observed {observed:?}")]
    #[diagnostic(
        code(case::cleanup_order),
        help("Stack guards must be torn down once each, in reverse creation order.")
    )]
    CleanupOrder {
        expected: Vec<usize>,
        observed: Vec<usize>,
    },

    #[error("Filter ran after {torn_down} guard(s) were already torn down")]
    #[diagnostic(
        code(case::filter_ordering),
        help("Structured filters must run before unwinding starts.")
    )]
    FilterOrdering { torn_down: usize },

    #[error("Unexpected disposition: {0}")]
    #[diagnostic(code(case::unexpected_disposition))]
    UnexpectedDisposition(String),
}
