//! Harness settings
//!
//! TOML file plus environment. The file sets the configuration store defaults,
//! the engine launcher and any extra per-algorithm overrides.
//!
//! ```toml
//! data_access_token = "..."
//! parallel = false
//! report_path = "results/regression.json"
//! depletion_checks = ["MyTrainingAlgorithm"]
//!
//! [defaults]
//! "regression-test-languages" = "CSharp,Python"
//!
//! [engine]
//! program = "./engine-launcher"
//! args = ["--data-folder", "../Data"]
//!
//! [[overrides]]
//! algorithm = "MyTrainingAlgorithm"
//! key = "rate-bucket-capacity"
//! value = "1"
//! ```

use crate::regression::config_store::InMemoryConfigStore;
use crate::regression::engine::ProcessEngine;
use crate::regression::error::HarnessError;
use crate::regression::overrides::{OverrideRegistry, DEFAULT_DATA_ACCESS_TOKEN};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "REGRESSION_CONFIG_PATH";
pub const DATA_ACCESS_TOKEN_ENV: &str = "REGRESSION_DATA_ACCESS_TOKEN";
pub const DEFAULT_CONFIG_PATH: &str = "regression.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Launcher program; `None` means no engine is configured.
    #[serde(default)]
    pub program: Option<PathBuf>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

/// Extra per-algorithm override, appended after the built-in entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideSetting {
    pub algorithm: String,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessSettings {
    #[serde(default = "default_data_access_token")]
    pub data_access_token: String,

    /// Extra algorithms whose runs must leave zero bucket tokens.
    #[serde(default)]
    pub depletion_checks: Vec<String>,

    /// Run cases in parallel with isolated configuration stores.
    #[serde(default)]
    pub parallel: bool,

    #[serde(default)]
    pub report_path: Option<PathBuf>,

    // Tables last so the file serializes as valid TOML
    /// Configuration store defaults.
    #[serde(default)]
    pub defaults: BTreeMap<String, String>,

    #[serde(default)]
    pub engine: EngineSettings,

    #[serde(default)]
    pub overrides: Vec<OverrideSetting>,
}

fn default_data_access_token() -> String {
    DEFAULT_DATA_ACCESS_TOKEN.to_string()
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            data_access_token: default_data_access_token(),
            depletion_checks: Vec::new(),
            parallel: false,
            report_path: None,
            defaults: BTreeMap::new(),
            engine: EngineSettings::default(),
            overrides: Vec::new(),
        }
    }
}

impl HarnessSettings {
    /// Load from TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HarnessError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::Settings(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&contents).map_err(|e| {
            HarnessError::Settings(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Load from `path` if it exists, otherwise use defaults. A malformed file is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, HarnessError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("Using default harness settings ({} not found)", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Load from environment (`.env` honoured) or the default path.
    pub fn from_env() -> Result<Self, HarnessError> {
        Self::from_env_with_path(None)
    }

    /// Load settings with the environment layer applied.
    ///
    /// An explicit `path` must exist. Without one, the path comes from
    /// `REGRESSION_CONFIG_PATH` or the default and may be missing.
    pub fn from_env_with_path(path: Option<&Path>) -> Result<Self, HarnessError> {
        dotenv::dotenv().ok();

        let mut settings = match path {
            Some(path) => Self::load(path)?,
            None => {
                let path = std::env::var(CONFIG_PATH_ENV)
                    .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
                Self::load_or_default(&path)?
            }
        };
        settings.apply_env();
        Ok(settings)
    }

    /// `REGRESSION_DATA_ACCESS_TOKEN` wins over the file's token when set and non-blank.
    fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(DATA_ACCESS_TOKEN_ENV) {
            if !token.trim().is_empty() {
                self.data_access_token = token;
            }
        }
    }

    /// Save to TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Fresh configuration store holding the configured defaults.
    pub fn config_store(&self) -> InMemoryConfigStore {
        InMemoryConfigStore::with_defaults(self.defaults.clone())
    }

    /// Built-in override table plus the file's extra entries.
    pub fn override_registry(&self) -> OverrideRegistry {
        let registry = self
            .overrides
            .iter()
            .fold(OverrideRegistry::builtin(&self.data_access_token), |registry, entry| {
                registry.with_override(&entry.algorithm, &entry.key, &entry.value)
            });
        self.depletion_checks
            .iter()
            .fold(registry, |registry, identity| registry.with_depletion_check(identity))
    }

    pub fn process_engine(&self) -> Option<ProcessEngine> {
        let program = self.engine.program.as_ref()?;
        let mut engine = ProcessEngine::new(program).with_args(self.engine.args.iter().cloned());
        if let Some(dir) = &self.engine.working_dir {
            engine = engine.with_working_dir(dir);
        }
        Some(engine)
    }
}
