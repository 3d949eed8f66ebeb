//! Algorithm Descriptors
//!
//! A descriptor is the static declaration an algorithm makes about itself: its
//! identity, whether it can run in this environment, which language variants
//! exist, and the baseline its run must reproduce.

use crate::regression::error::HarnessError;
use crate::regression::language::Language;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Sentinel for expectation counts whose value is non-deterministic.
pub const NON_DETERMINISTIC: i64 = -1;

/// Alpha runtime statistics baseline. Opaque to the harness; forwarded to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlphaStatistics(pub BTreeMap<String, String>);

impl AlphaStatistics {
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.0.insert(name.to_string(), value.to_string());
        self
    }
}

/// Static declaration of one regression algorithm.
///
/// Built once by a factory function and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmDescriptor {
    identity: String,
    can_run_locally: bool,
    languages: BTreeSet<Language>,
    expected_statistics: BTreeMap<String, String>,
    expected_alpha_statistics: Option<AlphaStatistics>,
    expected_data_points: i64,
    expected_history_data_points: i32,
}

impl AlgorithmDescriptor {
    /// New descriptor that runs locally, supports no language yet and skips the count checks.
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            can_run_locally: true,
            languages: BTreeSet::new(),
            expected_statistics: BTreeMap::new(),
            expected_alpha_statistics: None,
            expected_data_points: NON_DETERMINISTIC,
            expected_history_data_points: NON_DETERMINISTIC as i32,
        }
    }

    pub fn can_run_locally(mut self, can_run_locally: bool) -> Self {
        self.can_run_locally = can_run_locally;
        self
    }

    pub fn languages(mut self, languages: impl IntoIterator<Item = Language>) -> Self {
        self.languages.extend(languages);
        self
    }

    pub fn statistic(mut self, name: &str, value: &str) -> Self {
        self.expected_statistics.insert(name.to_string(), value.to_string());
        self
    }

    pub fn alpha_statistics(mut self, alpha: AlphaStatistics) -> Self {
        self.expected_alpha_statistics = Some(alpha);
        self
    }

    pub fn data_points(mut self, data_points: i64) -> Self {
        self.expected_data_points = data_points;
        self
    }

    pub fn history_data_points(mut self, history_data_points: i32) -> Self {
        self.expected_history_data_points = history_data_points;
        self
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn runs_locally(&self) -> bool {
        self.can_run_locally
    }

    pub fn supported_languages(&self) -> &BTreeSet<Language> {
        &self.languages
    }

    pub fn expected_statistics(&self) -> &BTreeMap<String, String> {
        &self.expected_statistics
    }

    pub fn expected_alpha_statistics(&self) -> Option<&AlphaStatistics> {
        self.expected_alpha_statistics.as_ref()
    }

    pub fn expected_data_points(&self) -> i64 {
        self.expected_data_points
    }

    pub fn expected_history_data_points(&self) -> i32 {
        self.expected_history_data_points
    }

    /// Reject declarations that cannot produce well-formed cases.
    pub fn validate(&self) -> Result<(), HarnessError> {
        let invalid = |reason: &str| HarnessError::InvalidDescriptor {
            identity: self.identity.clone(),
            reason: reason.to_string(),
        };

        if self.identity.trim().is_empty() {
            return Err(invalid("identity is empty"));
        }
        // Identity is the second half of "{Language}/{Identity}"
        if self.identity.contains('/') || self.identity.chars().any(char::is_whitespace) {
            return Err(invalid("identity must not contain '/' or whitespace"));
        }
        if self.expected_data_points < NON_DETERMINISTIC {
            return Err(invalid("expected data points must be >= -1"));
        }
        if i64::from(self.expected_history_data_points) < NON_DETERMINISTIC {
            return Err(invalid("expected history data points must be >= -1"));
        }
        Ok(())
    }
}
