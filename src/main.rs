/*!
 * Unwind Harness - Main Entry Point
 *
 * Resolves the frame module, runs the case matrix, and exits nonzero if
 * setup failed or any case failed. A case that never reaches its handler
 * aborts the process.
 */

use std::process::ExitCode;
use tracing::{error, info};

use unwind_harness::{
    init_tracing, DispatchTable, HarnessConfig, HarnessError, ModuleRegistry, Orchestrator,
    TestMatrix,
};

fn main() -> ExitCode {
    let config = match HarnessConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(false);
            error!("{:?}", miette::Report::new(e));
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.trace_json);

    info!("Unwind harness starting...");
    info!("================================================");
    info!(
        module = %config.module_path.display(),
        depths = ?config.depths,
        drivers = ?config.drivers,
        "configuration loaded"
    );
    info!("guard teardowns are logged per case; RUST_LOG=unwind_harness=debug adds filter and guard detail");

    let registry = ModuleRegistry::with_builtin();
    let dispatch = match DispatchTable::load(&registry, &config.module_path) {
        Ok(dispatch) => dispatch,
        Err(e) => {
            error!("{:?}", miette::Report::new(e));
            return ExitCode::FAILURE;
        }
    };

    let matrix = TestMatrix::builder()
        .depths(config.depths.iter().copied())
        .drivers(config.drivers.iter().copied())
        .error_code(config.error_code)
        .build();
    info!(cases = matrix.len(), "matrix built");

    let orchestrator = Orchestrator::new(dispatch).collect_between_cases(config.collect_between_cases);
    let report = match orchestrator.run_matrix(&matrix) {
        Ok(report) => report,
        Err(e @ HarnessError::PropagationFailure { .. }) => {
            error!("{}", e);
            std::process::abort();
        }
        Err(e) => {
            error!("{:?}", miette::Report::new(e));
            return ExitCode::FAILURE;
        }
    };

    if let Some(path) = &config.report_path {
        if let Err(e) = report.write_json(path) {
            error!("{:?}", miette::Report::new(e));
            return ExitCode::FAILURE;
        }
    }

    // run_matrix already logged the summary
    info!("================================================");
    if report.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
