//! Configuration Store
//!
//! Key/value settings consumed by the execution engine. The harness only needs
//! reset-to-defaults, set and get; the store is passed explicitly to the runner
//! and to the engine so every case works against its own configuration scope.

use std::collections::BTreeMap;

/// Configuration keys read or written by the harness.
pub mod keys {
    /// Baseline auth for external data access.
    pub const DATA_ACCESS_TOKEN: &str = "external-data-access-token";
    /// Baseline log verbosity control.
    pub const SUPPRESS_LOG_FORWARDING: &str = "suppress-log-forwarding";
    pub const SUBSCRIPTION_LIMIT_MINUTE: &str = "subscription-rate-limit-minute";
    pub const SUBSCRIPTION_LIMIT_SECOND: &str = "subscription-rate-limit-second";
    pub const SUBSCRIPTION_LIMIT_TICK: &str = "subscription-rate-limit-tick";
    /// Max wall-clock loop budget, in minutes.
    pub const TIME_LOOP_CEILING: &str = "execution-time-loop-ceiling";
    pub const BUCKET_CAPACITY: &str = "rate-bucket-capacity";
    pub const BUCKET_REFILL: &str = "rate-bucket-refill";
    /// Comma separated language allow-list.
    pub const TEST_LANGUAGES: &str = "regression-test-languages";
}

/// Contract of the key/value configuration store.
pub trait ConfigStore {
    /// Restore every key to its default. Resetting twice equals resetting once.
    fn reset(&mut self);

    fn set(&mut self, key: &str, value: &str);

    fn get(&self, key: &str) -> Option<String>;

    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Current effective key/value view.
    fn snapshot(&self) -> BTreeMap<String, String>;
}

/// In-process store with a fixed set of defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryConfigStore {
    defaults: BTreeMap<String, String>,
    values: BTreeMap<String, String>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(defaults: BTreeMap<String, String>) -> Self {
        Self {
            values: defaults.clone(),
            defaults,
        }
    }

    pub fn defaults(&self) -> &BTreeMap<String, String> {
        &self.defaults
    }

    pub fn is_at_defaults(&self) -> bool {
        self.values == self.defaults
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn reset(&mut self) {
        self.values.clone_from(&self.defaults);
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn snapshot(&self) -> BTreeMap<String, String> {
        self.values.clone()
    }
}
