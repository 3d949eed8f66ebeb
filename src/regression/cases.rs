//! Test Case Builder
//!
//! Expands descriptors x allowed languages into concrete test cases. Output is
//! sorted by `(Language, AlgorithmIdentity)` by name so identifiers and run order
//! do not depend on registry enumeration order.

use crate::regression::descriptor::{AlgorithmDescriptor, AlphaStatistics};
use crate::regression::error::HarnessError;
use crate::regression::language::{Language, LanguageAllowList};
use crate::regression::status::{AlgorithmStatus, StatusOverrideTable};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// One concrete (algorithm, language) combination to execute and verify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub algorithm: String,
    pub language: Language,
    pub expected_status: AlgorithmStatus,
    pub expected_statistics: BTreeMap<String, String>,
    pub expected_alpha_statistics: Option<AlphaStatistics>,
    pub expected_data_points: i64,
    pub expected_history_data_points: i32,
}

impl TestCase {
    /// Derive the case for one `(descriptor, language)` pair.
    pub fn from_descriptor(
        descriptor: &AlgorithmDescriptor,
        language: Language,
        expected_status: AlgorithmStatus,
    ) -> Self {
        Self {
            algorithm: descriptor.identity().to_string(),
            language,
            expected_status,
            expected_statistics: descriptor.expected_statistics().clone(),
            expected_alpha_statistics: descriptor.expected_alpha_statistics().cloned(),
            expected_data_points: descriptor.expected_data_points(),
            expected_history_data_points: descriptor.expected_history_data_points(),
        }
    }

    /// Stable external identifier `"{Language}/{AlgorithmIdentity}"`.
    pub fn id(&self) -> String {
        format!("{}/{}", self.language, self.algorithm)
    }

    fn sort_key(&self) -> (&'static str, &str) {
        (self.language.as_str(), self.algorithm.as_str())
    }
}

impl std::fmt::Display for TestCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.language, self.algorithm)
    }
}

pub struct CaseBuilder<'a> {
    allow_list: &'a LanguageAllowList,
    statuses: &'a StatusOverrideTable,
}

impl<'a> CaseBuilder<'a> {
    pub fn new(allow_list: &'a LanguageAllowList, statuses: &'a StatusOverrideTable) -> Self {
        Self { allow_list, statuses }
    }

    /// Build the sorted case list.
    ///
    /// Descriptors that cannot run locally produce no case. A duplicate case
    /// identifier is a setup error.
    pub fn build(&self, descriptors: &[AlgorithmDescriptor]) -> Result<Vec<TestCase>, HarnessError> {
        let mut cases = Vec::new();

        for descriptor in descriptors {
            if !descriptor.runs_locally() {
                debug!(algorithm = %descriptor.identity(), "No cases: cannot run locally");
                continue;
            }

            let languages = self.allow_list.intersect(descriptor.supported_languages());
            if languages.is_empty() {
                debug!(
                    algorithm = %descriptor.identity(),
                    allow_list = %self.allow_list,
                    "No cases: no supported language is allowed"
                );
            }

            let expected_status = self.statuses.expected_for(descriptor.identity());
            cases.extend(
                languages
                    .into_iter()
                    .map(|language| TestCase::from_descriptor(descriptor, language, expected_status)),
            );
        }

        cases.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        let mut seen = BTreeSet::new();
        for case in &cases {
            if !seen.insert(case.id()) {
                return Err(HarnessError::DuplicateCase(case.id()));
            }
        }

        info!(
            descriptors = descriptors.len(),
            cases = cases.len(),
            allow_list = %self.allow_list,
            "Test cases generated"
        );
        Ok(cases)
    }
}

/// Post-build selection of a subset of cases. Preserves order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseFilter {
    /// Case-sensitive substring of the algorithm identity.
    pub algorithm: Option<String>,
    pub language: Option<Language>,
}

impl CaseFilter {
    pub fn is_empty(&self) -> bool {
        self.algorithm.is_none() && self.language.is_none()
    }

    pub fn matches(&self, case: &TestCase) -> bool {
        let algorithm_ok = self
            .algorithm
            .as_deref()
            .map_or(true, |needle| case.algorithm.contains(needle));
        let language_ok = self.language.map_or(true, |language| case.language == language);
        algorithm_ok && language_ok
    }

    pub fn apply(&self, cases: Vec<TestCase>) -> Vec<TestCase> {
        if self.is_empty() {
            return cases;
        }
        cases.into_iter().filter(|case| self.matches(case)).collect()
    }
}
