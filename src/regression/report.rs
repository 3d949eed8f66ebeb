//! Suite Report
//!
//! Per-case outcomes plus a summary. Written as JSON for CI artifacts and
//! rendered as text for the terminal.

use crate::regression::language::Language;
use crate::regression::verifier::{format_failures, CheckFailure};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How a single case ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Passed,
    /// Engine returned a result that does not match the expectations.
    Failed { failures: Vec<CheckFailure> },
    /// Engine did not return a result.
    Errored { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseOutcome {
    pub id: String,
    pub algorithm: String,
    pub language: Language,
    pub status: OutcomeStatus,
    pub elapsed_ms: u64,
}

impl CaseOutcome {
    pub fn passed(&self) -> bool {
        matches!(self.status, OutcomeStatus::Passed)
    }

    /// One-line description of what went wrong, or "OK".
    pub fn reason(&self) -> String {
        match &self.status {
            OutcomeStatus::Passed => "OK".to_string(),
            OutcomeStatus::Failed { failures } => format_failures(failures),
            OutcomeStatus::Errored { message } => message.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    pub started_at: DateTime<Utc>,
    pub total_execution_ms: u64,
    pub cases: Vec<CaseOutcome>,
}

impl SuiteReport {
    pub fn new(started_at: DateTime<Utc>, total_execution_ms: u64, cases: Vec<CaseOutcome>) -> Self {
        Self {
            started_at,
            total_execution_ms,
            cases,
        }
    }

    pub fn passed(&self) -> bool {
        self.cases.iter().all(CaseOutcome::passed)
    }

    pub fn passed_count(&self) -> usize {
        self.cases.iter().filter(|c| c.passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.cases
            .iter()
            .filter(|c| matches!(c.status, OutcomeStatus::Failed { .. }))
            .count()
    }

    pub fn errored_count(&self) -> usize {
        self.cases
            .iter()
            .filter(|c| matches!(c.status, OutcomeStatus::Errored { .. }))
            .count()
    }

    pub fn failures(&self) -> Vec<&CaseOutcome> {
        self.cases.iter().filter(|c| !c.passed()).collect()
    }

    pub fn outcome(&self, id: &str) -> Option<&CaseOutcome> {
        self.cases.iter().find(|c| c.id == id)
    }

    /// Format as compact summary.
    pub fn format_summary(&self) -> String {
        let mut out = String::new();
        out.push_str("=== REGRESSION SUITE REPORT ===\n");
        out.push_str(&format!("Status: {}\n", if self.passed() { "PASS" } else { "FAIL" }));
        out.push_str(&format!("Started: {}\n", self.started_at.to_rfc3339()));
        out.push_str(&format!(
            "Cases: {} (passed: {}, failed: {}, errored: {})\n",
            self.cases.len(),
            self.passed_count(),
            self.failed_count(),
            self.errored_count()
        ));
        out.push_str(&format!("Execution Time: {}ms\n\n", self.total_execution_ms));

        for case in &self.cases {
            let status = match case.status {
                OutcomeStatus::Passed => "PASS",
                OutcomeStatus::Failed { .. } => "FAIL",
                OutcomeStatus::Errored { .. } => "ERROR",
            };
            out.push_str(&format!("[{}] {} ({}ms) - {}\n", status, case.id, case.elapsed_ms, case.reason()));
        }

        out.push_str("===============================\n");
        out
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn read_json(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
