/*!
 * Module resolution failures
 */

use pretty_assertions::assert_eq;
use std::path::PathBuf;
use unwind_harness::core::guard::CleanupJournal;
use unwind_harness::core::limits::BUILTIN_MODULE_PATH;
use unwind_harness::dispatch::abi::{BUILD_HOSTED_FRAME, RAISE_FROM_HEAP, REQUIRED_EXPORTS};
use unwind_harness::dispatch::exports::unwind_build_native_frame;
use unwind_harness::dispatch::{DispatchTable, ExportTable, ModuleRegistry, Symbol};
use unwind_harness::SetupError;

#[test]
fn test_builtin_module_resolves() {
    let registry = ModuleRegistry::with_builtin();
    let table = DispatchTable::load(&registry, BUILTIN_MODULE_PATH).unwrap();
    assert_eq!(table.module(), "unwind-frames");

    // Same module through an equivalent path
    assert!(DispatchTable::load(&registry, "./lib/../unwind-frames.module").is_ok());
    assert_eq!(ExportTable::builtin().len(), REQUIRED_EXPORTS.len());
}

#[test]
fn test_missing_module() {
    let registry = ModuleRegistry::with_builtin();
    let err = DispatchTable::load(&registry, "./missing.module").unwrap_err();
    assert_eq!(
        err,
        SetupError::ModuleNotFound {
            path: PathBuf::from("missing.module")
        }
    );
    assert_eq!(err.to_string(), "Failed to load module missing.module");
}

#[test]
fn test_missing_export_runs_no_cases() {
    let mut registry = ModuleRegistry::new();
    registry.register(
        "./partial.module",
        ExportTable::builtin().without(BUILD_HOSTED_FRAME),
    );

    let before = CleanupJournal::len();
    let err = DispatchTable::load(&registry, "./partial.module").unwrap_err();
    assert_eq!(
        err,
        SetupError::MissingSymbol {
            module: "unwind-frames".to_string(),
            symbol: BUILD_HOSTED_FRAME,
        }
    );
    // Nothing was built or torn down
    assert_eq!(CleanupJournal::len(), before);
}

#[test]
fn test_export_with_wrong_signature() {
    let module = ExportTable::new("mislinked")
        .export(
            unwind_harness::dispatch::abi::RAISE_FROM_STACK,
            Symbol::BuildFrame(unwind_build_native_frame),
        )
        .export(RAISE_FROM_HEAP, Symbol::BuildFrame(unwind_build_native_frame));

    let err = DispatchTable::resolve(&module).unwrap_err();
    assert!(matches!(err, SetupError::SignatureMismatch { .. }), "{:?}", err);
}
