//! Result Verifier
//!
//! Compares an `ExecutionResult` against a case's expectations. Every applicable
//! check runs, in a fixed order, so one run reports every mismatched field:
//!
//! 1. final status (always)
//! 2. data points (unless the expectation is the `-1` sentinel)
//! 3. history data points (unless the expectation is the `-1` sentinel)
//! 4. remaining bucket tokens == 0 (algorithms flagged for the depletion check)

use crate::regression::cases::TestCase;
use crate::regression::descriptor::NON_DETERMINISTIC;
use crate::regression::engine::ExecutionResult;
use crate::regression::overrides::OverrideRegistry;
use serde::{Deserialize, Serialize};

/// Field a check compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckField {
    FinalStatus,
    DataPoints,
    HistoryDataPoints,
    RemainingBucketTokens,
}

impl CheckField {
    pub const fn as_str(self) -> &'static str {
        match self {
            CheckField::FinalStatus => "FinalStatus",
            CheckField::DataPoints => "DataPoints",
            CheckField::HistoryDataPoints => "HistoryDataPoints",
            CheckField::RemainingBucketTokens => "RemainingBucketTokens",
        }
    }
}

impl std::fmt::Display for CheckField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One mismatched field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckFailure {
    pub field: CheckField,
    pub expected: String,
    pub actual: String,
}

impl CheckFailure {
    fn new(field: CheckField, expected: impl ToString, actual: impl ToString) -> Self {
        Self {
            field,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

impl std::fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: expected {}, got {}", self.field, self.expected, self.actual)
    }
}

/// All failures joined with "; ".
pub fn format_failures(failures: &[CheckFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Pass/fail verdict for one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub case_id: String,
    pub failures: Vec<CheckFailure>,
}

impl Verdict {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn diagnostic(&self) -> String {
        format_failures(&self.failures)
    }
}

pub struct Verifier<'a> {
    overrides: &'a OverrideRegistry,
}

impl<'a> Verifier<'a> {
    /// The token-depletion set is read from the override registry.
    pub fn new(overrides: &'a OverrideRegistry) -> Self {
        Self { overrides }
    }

    pub fn verify(&self, case: &TestCase, result: &ExecutionResult) -> Verdict {
        let mut failures = Vec::new();

        if result.final_status != case.expected_status {
            failures.push(CheckFailure::new(
                CheckField::FinalStatus,
                case.expected_status,
                result.final_status,
            ));
        }

        if case.expected_data_points != NON_DETERMINISTIC
            && result.data_points != case.expected_data_points
        {
            failures.push(CheckFailure::new(
                CheckField::DataPoints,
                case.expected_data_points,
                result.data_points,
            ));
        }

        if i64::from(case.expected_history_data_points) != NON_DETERMINISTIC
            && result.history_data_points != case.expected_history_data_points
        {
            failures.push(CheckFailure::new(
                CheckField::HistoryDataPoints,
                case.expected_history_data_points,
                result.history_data_points,
            ));
        }

        if self.overrides.requires_token_depletion(&case.algorithm) {
            match result.remaining_bucket_tokens {
                Some(0) => {}
                Some(tokens) => {
                    failures.push(CheckFailure::new(CheckField::RemainingBucketTokens, 0, tokens))
                }
                None => failures.push(CheckFailure::new(
                    CheckField::RemainingBucketTokens,
                    0,
                    "none",
                )),
            }
        }

        Verdict {
            case_id: case.id(),
            failures,
        }
    }
}
