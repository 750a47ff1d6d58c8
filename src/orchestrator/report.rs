/*!
 * Matrix Report
 * Aggregated results of a harness run, optionally written as JSON
 */

use super::case::CaseReport;
use crate::core::errors::HarnessResult;
use crate::hosted::GcStats;
use crate::monitoring::generate_trace_id;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{error, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixReport {
    pub run_id: String,
    /// Module the exports were resolved from
    pub module: String,
    pub cases: Vec<CaseReport>,
    /// Collector pass after the last case
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_collection: Option<GcStats>,
}

impl MatrixReport {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            run_id: generate_trace_id(),
            module: module.into(),
            cases: Vec::new(),
            final_collection: None,
        }
    }

    pub fn push(&mut self, report: CaseReport) {
        self.cases.push(report);
    }

    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.cases.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseReport> {
        self.cases.iter().filter(|c| !c.passed())
    }

    pub fn summary(&self) -> String {
        format!(
            "{} cases: {} passed, {} failed",
            self.cases.len(),
            self.passed(),
            self.failed()
        )
    }

    pub fn log_summary(&self) {
        if self.all_passed() {
            info!(run_id = %self.run_id, "{}", self.summary());
        } else {
            for report in self.failures() {
                error!(trace_id = %report.trace_id, "FAILED {}", report.case);
            }
            error!(run_id = %self.run_id, "{}", self.summary());
        }
    }

    /// Write the report as pretty-printed JSON
    pub fn write_json(&self, path: impl AsRef<Path>) -> HarnessResult<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        info!(path = %path.display(), "report written");
        Ok(())
    }

    pub fn read_json(path: impl AsRef<Path>) -> HarnessResult<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
}
