/*!
 * Matrix runs and the JSON report
 */

use pretty_assertions::assert_eq;
use serde_json::Value;
use unwind_harness::dispatch::DispatchTable;
use unwind_harness::orchestrator::{Driver, MatrixReport, Orchestrator, TestMatrix, Verdict};
use unwind_harness::{AllocationSite, ExceptionKind};

#[test]
fn test_small_matrix_passes() {
    let matrix = TestMatrix::builder().depths([0, 3]).build();
    let orchestrator = Orchestrator::new(DispatchTable::builtin().unwrap());
    let report = orchestrator.run_matrix(&matrix).unwrap();

    // 2 drivers x 3 kinds x 2 sites x 2 depths, plus one control case per site
    assert_eq!(report.cases.len(), 26);
    assert!(report.all_passed(), "{}", report.summary());
    assert_eq!(report.module, "unwind-frames");

    let stats = report.final_collection.clone().unwrap();
    assert_eq!(stats.survivors, 0);
}

#[test]
fn test_report_written_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("harness.json");

    let matrix = TestMatrix::builder()
        .drivers([Driver::Typed])
        .kinds([ExceptionKind::Structured])
        .sites([AllocationSite::Heap])
        .depths([5])
        .build();
    let orchestrator = Orchestrator::new(DispatchTable::builtin().unwrap());
    let report = orchestrator.run_matrix(&matrix).unwrap();
    report.write_json(&path).unwrap();

    let json: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let cases = json["cases"].as_array().unwrap();
    assert_eq!(cases.len(), 2);
    assert_eq!(cases[0]["case"]["kind"], "structured");
    assert_eq!(cases[0]["case"]["site"], "heap");
    assert_eq!(cases[0]["case"]["driver"], "typed");
    assert_eq!(cases[0]["verdict"], "passed");
    assert_eq!(cases[0]["teardown"], serde_json::json!([1, 2, 3, 4, 5]));
    assert_eq!(cases[1]["handled_by"], "outer");

    let loaded = MatrixReport::read_json(&path).unwrap();
    assert_eq!(loaded.run_id, report.run_id);
    assert!(loaded.cases.iter().all(|c| c.verdict == Verdict::Passed));
}
