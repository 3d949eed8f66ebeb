//! Regression Harness
//!
//! Discovers every registered regression algorithm, expands it into one test
//! case per allowed language, shapes the configuration for each case, runs it
//! through an external execution engine and verifies the result against the
//! algorithm's declared baseline.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐      ┌──────────────────────┐
//! │  DescriptorRegistry  │      │  LanguageAllowList   │
//! │  (factory table)     │      │  StatusOverrideTable │
//! └──────────┬───────────┘      └──────────┬───────────┘
//!            │                             │
//!            └──────────────┬──────────────┘
//!                           ▼
//!                 ┌──────────────────┐
//!                 │   CaseBuilder    │  sorted by (Language, Algorithm)
//!                 └────────┬─────────┘
//!                          │  for each case
//!                          ▼
//! ┌──────────────────┐   ┌──────────────────┐   ┌──────────────────┐
//! │ OverrideRegistry │──▶│      Runner      │──▶│ ExecutionEngine  │
//! │ (reset+apply)    │   │                  │◀──│ (external)       │
//! └──────────────────┘   └────────┬─────────┘   └──────────────────┘
//!          ▲                      │
//!          │                      ▼
//! ┌──────────────────┐   ┌──────────────────┐
//! │   ConfigStore    │   │     Verifier     │──▶ SuiteReport
//! │ (per-case scope) │   └──────────────────┘
//! └──────────────────┘
//! ```
//!
//! # Guarantees
//!
//! - **Ordering**: cases are totally ordered by `(Language, AlgorithmIdentity)` name
//! - **Isolation**: every case starts from defaults + baseline + its own overrides
//! - **Fail-fast setup**: a broken descriptor aborts before any case is generated
//! - **No silent skips**: only `can_run_locally == false` and the language
//!   allow-list remove cases, both at generation time

pub mod cases;
pub mod catalog;
pub mod config_store;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod language;
pub mod overrides;
pub mod registry;
pub mod report;
pub mod runner;
pub mod settings;
pub mod status;
pub mod verifier;


// Re-exports for convenience
pub use cases::{CaseBuilder, CaseFilter, TestCase};
pub use config_store::{keys, ConfigStore, InMemoryConfigStore};
pub use descriptor::{AlgorithmDescriptor, AlphaStatistics, NON_DETERMINISTIC};
pub use engine::{EngineRequest, ExecutionEngine, ExecutionResult, ProcessEngine};
pub use error::{DescriptorError, EngineError, HarnessError};
pub use language::{Language, LanguageAllowList, DEFAULT_LANGUAGES};
pub use overrides::{ConfigOverride, OverrideRegistry, DEFAULT_DATA_ACCESS_TOKEN};
pub use registry::{DescriptorFactory, DescriptorRegistry};
pub use report::{CaseOutcome, OutcomeStatus, SuiteReport};
pub use runner::Runner;
pub use settings::HarnessSettings;
pub use status::{AlgorithmStatus, StatusOverrideTable};
pub use verifier::{format_failures, CheckFailure, CheckField, Verdict, Verifier};

/// Load the registry and build the sorted case list in one step.
///
/// The allow-list is read from `store` once, here.
pub fn generate_cases(
    registry: &DescriptorRegistry,
    statuses: &StatusOverrideTable,
    store: &dyn ConfigStore,
) -> Result<Vec<TestCase>, HarnessError> {
    let descriptors = registry.load_runnable()?;
    let allow_list = LanguageAllowList::from_store(store)?;
    CaseBuilder::new(&allow_list, statuses).build(&descriptors)
}
