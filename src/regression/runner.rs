//! Case Runner
//!
//! For one case: reset the configuration store, apply baseline and per-algorithm
//! overrides, invoke the engine, then verify the result. A case never starts
//! verification before its engine call returns; failures are reported once,
//! never retried.
//!
//! # Suite modes
//!
//! - `run_suite` - sequential over one store, reset before every case
//! - `run_suite_isolated` - parallel, each case gets its own fresh store
//! - `run_suite_shared` - parallel callers over one store, lock held reset-through-verify

use crate::regression::cases::TestCase;
use crate::regression::config_store::ConfigStore;
use crate::regression::engine::{EngineRequest, ExecutionEngine, ExecutionResult};
use crate::regression::error::EngineError;
use crate::regression::overrides::OverrideRegistry;
use crate::regression::report::{CaseOutcome, OutcomeStatus, SuiteReport};
use crate::regression::verifier::Verifier;
use chrono::Utc;
use parking_lot::Mutex;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{info, warn};

pub struct Runner<'a> {
    engine: &'a dyn ExecutionEngine,
    overrides: &'a OverrideRegistry,
}

impl<'a> Runner<'a> {
    pub fn new(engine: &'a dyn ExecutionEngine, overrides: &'a OverrideRegistry) -> Self {
        Self { engine, overrides }
    }

    /// Configure the store for `case` and invoke the engine.
    pub fn run_case(
        &self,
        case: &TestCase,
        store: &mut dyn ConfigStore,
    ) -> Result<ExecutionResult, EngineError> {
        let applied = self.overrides.prepare(&case.algorithm, store);
        info!(case = %case, overrides = applied, "Running case");
        self.engine.run(&EngineRequest::for_case(case), &*store)
    }

    /// Run and verify one case.
    pub fn execute(&self, case: &TestCase, store: &mut dyn ConfigStore) -> CaseOutcome {
        let start = Instant::now();
        let status = match self.run_case(case, store) {
            Ok(result) => {
                let verdict = Verifier::new(self.overrides).verify(case, &result);
                if verdict.passed() {
                    OutcomeStatus::Passed
                } else {
                    warn!(case = %case, diagnostic = %verdict.diagnostic(), "Case failed verification");
                    OutcomeStatus::Failed {
                        failures: verdict.failures,
                    }
                }
            }
            Err(err) => {
                warn!(case = %case, error = %err, "Engine run failed");
                OutcomeStatus::Errored {
                    message: err.to_string(),
                }
            }
        };

        CaseOutcome {
            id: case.id(),
            algorithm: case.algorithm.clone(),
            language: case.language,
            status,
            elapsed_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Run every case in order against one shared store.
    pub fn run_suite(&self, cases: &[TestCase], store: &mut dyn ConfigStore) -> SuiteReport {
        let started_at = Utc::now();
        let start = Instant::now();
        let outcomes = cases.iter().map(|case| self.execute(case, store)).collect();
        finish(started_at, start, outcomes)
    }

    /// Run cases in parallel, each against its own store from `make_store`.
    pub fn run_suite_isolated<S, F>(&self, cases: &[TestCase], make_store: F) -> SuiteReport
    where
        S: ConfigStore,
        F: Fn() -> S + Sync,
    {
        let started_at = Utc::now();
        let start = Instant::now();
        let outcomes = cases
            .par_iter()
            .map(|case| {
                let mut store = make_store();
                self.execute(case, &mut store)
            })
            .collect();
        finish(started_at, start, outcomes)
    }

    /// Run cases from parallel workers that share one store.
    ///
    /// The lock is held for the whole reset-through-verify window of each case.
    pub fn run_suite_shared<S>(&self, cases: &[TestCase], store: &Mutex<S>) -> SuiteReport
    where
        S: ConfigStore + Send,
    {
        let started_at = Utc::now();
        let start = Instant::now();
        let outcomes = cases
            .par_iter()
            .map(|case| {
                let mut guard = store.lock();
                self.execute(case, &mut *guard)
            })
            .collect();
        finish(started_at, start, outcomes)
    }
}

fn finish(started_at: chrono::DateTime<Utc>, start: Instant, outcomes: Vec<CaseOutcome>) -> SuiteReport {
    let report = SuiteReport::new(started_at, start.elapsed().as_millis() as u64, outcomes);
    info!(
        cases = report.cases.len(),
        passed = report.passed_count(),
        failed = report.failed_count(),
        errored = report.errored_count(),
        elapsed_ms = report.total_execution_ms,
        "Regression suite finished"
    );
    report
}
