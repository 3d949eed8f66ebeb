//! Override Registry
//!
//! Declarative environment shaping per case. Before a case runs the store is
//! reset, the baseline overrides are applied, then the overrides registered for
//! the case's algorithm are applied in list order (later entries win).
//!
//! New special cases are new table entries; the runner never branches on identity.

use crate::regression::config_store::{keys, ConfigStore};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Token used for external data access when none is configured.
pub const DEFAULT_DATA_ACCESS_TOKEN: &str = "regression-harness-token";

/// One configuration assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigOverride {
    pub key: String,
    pub value: String,
}

impl ConfigOverride {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideRegistry {
    baseline: Vec<ConfigOverride>,
    per_algorithm: BTreeMap<String, Vec<ConfigOverride>>,
    depletion_checks: BTreeSet<String>,
}

impl OverrideRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Baseline and per-algorithm entries for the built-in catalog.
    pub fn builtin(data_access_token: &str) -> Self {
        Self::new()
            .with_baseline(keys::DATA_ACCESS_TOKEN, data_access_token)
            .with_baseline(keys::SUPPRESS_LOG_FORWARDING, "true")
            // Consistency check subscribes to every contract of the chain
            .with_override(
                "OptionChainConsistencyRegressionAlgorithm",
                keys::SUBSCRIPTION_LIMIT_MINUTE,
                "100",
            )
            .with_override(
                "OptionChainConsistencyRegressionAlgorithm",
                keys::SUBSCRIPTION_LIMIT_SECOND,
                "100",
            )
            .with_override(
                "OptionChainConsistencyRegressionAlgorithm",
                keys::SUBSCRIPTION_LIMIT_TICK,
                "100",
            )
            .with_training_budget("TrainingOnDataRegressionAlgorithm")
            .with_training_budget("TrainingInitializeRegressionAlgorithm")
            .with_depletion_check("TrainingOnDataRegressionAlgorithm")
    }

    /// Half-minute loop ceiling and a one-token bucket that never refills.
    fn with_training_budget(self, identity: &str) -> Self {
        self.with_override(identity, keys::TIME_LOOP_CEILING, "0.5")
            .with_override(identity, keys::BUCKET_CAPACITY, "1")
            .with_override(identity, keys::BUCKET_REFILL, "0")
    }

    pub fn with_baseline(mut self, key: &str, value: &str) -> Self {
        self.baseline.push(ConfigOverride::new(key, value));
        self
    }

    pub fn with_override(mut self, identity: &str, key: &str, value: &str) -> Self {
        self.per_algorithm
            .entry(identity.to_string())
            .or_default()
            .push(ConfigOverride::new(key, value));
        self
    }

    /// Flag an algorithm whose run must leave zero bucket tokens.
    pub fn with_depletion_check(mut self, identity: &str) -> Self {
        self.depletion_checks.insert(identity.to_string());
        self
    }

    pub fn baseline(&self) -> &[ConfigOverride] {
        &self.baseline
    }

    pub fn for_algorithm(&self, identity: &str) -> &[ConfigOverride] {
        self.per_algorithm.get(identity).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn requires_token_depletion(&self, identity: &str) -> bool {
        self.depletion_checks.contains(identity)
    }

    /// Apply baseline then algorithm-specific overrides on top of the store's current state.
    ///
    /// Returns the number of assignments made.
    pub fn apply(&self, identity: &str, store: &mut dyn ConfigStore) -> usize {
        let specific = self.for_algorithm(identity);
        for entry in self.baseline.iter().chain(specific) {
            debug!(algorithm = %identity, key = %entry.key, value = %entry.value, "Config override");
            store.set(&entry.key, &entry.value);
        }
        self.baseline.len() + specific.len()
    }

    /// Reset the store to defaults, then apply this algorithm's overrides.
    pub fn prepare(&self, identity: &str, store: &mut dyn ConfigStore) -> usize {
        store.reset();
        self.apply(identity, store)
    }

    /// Configuration a case must observe: defaults + baseline + its own overrides.
    pub fn expected_config(
        &self,
        identity: &str,
        defaults: &BTreeMap<String, String>,
    ) -> BTreeMap<String, String> {
        let mut expected = defaults.clone();
        for entry in self.baseline.iter().chain(self.for_algorithm(identity)) {
            expected.insert(entry.key.clone(), entry.value.clone());
        }
        expected
    }
}
