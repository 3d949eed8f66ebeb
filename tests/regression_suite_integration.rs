//! Integration tests for the regression harness
//!
//! Drives the public API end to end with an in-process engine, then the
//! `regression_run` binary against a shell launcher.

use algo_regression::regression::{
    generate_cases, keys, AlgorithmDescriptor, AlgorithmStatus, CaseBuilder, ConfigStore,
    DescriptorError, DescriptorRegistry, EngineError, EngineRequest, ExecutionEngine,
    ExecutionResult, HarnessError, InMemoryConfigStore, Language, LanguageAllowList,
    OverrideRegistry, Runner, StatusOverrideTable, SuiteReport,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

// =============================================================================
// FAKE ENGINE
// =============================================================================

/// Behaves like a well-formed engine: drains one bucket token per run and
/// returns a configurable data point count.
struct BucketEngine {
    data_points: Mutex<BTreeMap<String, i64>>,
    seen: Mutex<Vec<BTreeMap<String, String>>>,
}

impl BucketEngine {
    fn new() -> Self {
        Self {
            data_points: Mutex::new(BTreeMap::new()),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn with_data_points(self, algorithm: &str, data_points: i64) -> Self {
        self.data_points.lock().insert(algorithm.to_string(), data_points);
        self
    }
}

impl ExecutionEngine for BucketEngine {
    fn run(
        &self,
        request: &EngineRequest<'_>,
        config: &dyn ConfigStore,
    ) -> Result<ExecutionResult, EngineError> {
        self.seen.lock().push(config.snapshot());

        let capacity: i64 = config
            .get_or(keys::BUCKET_CAPACITY, "60")
            .parse()
            .map_err(|_| EngineError::Protocol("bad bucket capacity".to_string()))?;
        let data_points = self
            .data_points
            .lock()
            .get(request.algorithm)
            .copied()
            .unwrap_or(1000);

        Ok(ExecutionResult::new(request.expected_status, data_points, 0)
            .with_remaining_tokens(capacity - 1))
    }
}

fn store() -> InMemoryConfigStore {
    let mut defaults = BTreeMap::new();
    defaults.insert(keys::BUCKET_CAPACITY.to_string(), "60".to_string());
    defaults.insert(keys::TEST_LANGUAGES.to_string(), "CSharp,Python".to_string());
    InMemoryConfigStore::with_defaults(defaults)
}

fn local_descriptor() -> Result<AlgorithmDescriptor, DescriptorError> {
    Ok(AlgorithmDescriptor::new("SimpleMovingAverageAlgorithm")
        .languages([Language::CSharp, Language::Python])
        .data_points(1000)
        .history_data_points(0))
}

fn offline_descriptor() -> Result<AlgorithmDescriptor, DescriptorError> {
    Ok(AlgorithmDescriptor::new("OfflineDataAlgorithm")
        .can_run_locally(false)
        .languages(Language::ALL))
}

fn training_descriptor() -> Result<AlgorithmDescriptor, DescriptorError> {
    Ok(AlgorithmDescriptor::new("TrainingOnDataRegressionAlgorithm")
        .languages([Language::CSharp])
        .data_points(-1)
        .history_data_points(0))
}

fn broken_descriptor() -> Result<AlgorithmDescriptor, DescriptorError> {
    Err(DescriptorError::new("missing data file"))
}

fn mislabelled_descriptor() -> Result<AlgorithmDescriptor, DescriptorError> {
    Ok(AlgorithmDescriptor::new("SomethingElse").languages([Language::CSharp]))
}

// =============================================================================
// GENERATION
// =============================================================================

#[test]
fn test_local_algorithm_gets_one_case_per_language() {
    let registry = DescriptorRegistry::new()
        .with("SimpleMovingAverageAlgorithm", local_descriptor)
        .with("OfflineDataAlgorithm", offline_descriptor);

    let cases = generate_cases(&registry, &StatusOverrideTable::builtin(), &store()).unwrap();
    let ids: Vec<String> = cases.iter().map(|c| c.id()).collect();
    assert_eq!(
        ids,
        vec!["CSharp/SimpleMovingAverageAlgorithm", "Python/SimpleMovingAverageAlgorithm"]
    );
}

#[test]
fn test_offline_algorithm_never_reaches_case_builder_output() {
    let descriptor = offline_descriptor().unwrap();
    let allow = LanguageAllowList::new(Language::ALL).unwrap();
    let statuses = StatusOverrideTable::new();
    let cases = CaseBuilder::new(&allow, &statuses).build(&[descriptor]).unwrap();
    assert!(cases.is_empty());
}

#[test]
fn test_factory_failure_aborts_setup() {
    let registry = DescriptorRegistry::new()
        .with("SimpleMovingAverageAlgorithm", local_descriptor)
        .with("BrokenAlgorithm", broken_descriptor);

    let err = generate_cases(&registry, &StatusOverrideTable::builtin(), &store()).unwrap_err();
    assert!(matches!(err, HarnessError::DescriptorInstantiation { ref identity, .. } if identity == "BrokenAlgorithm"));
    assert!(err.to_string().contains("missing data file"));
}

#[test]
fn test_identity_mismatch_aborts_setup() {
    let registry = DescriptorRegistry::new().with("RegisteredName", mislabelled_descriptor);
    let err = generate_cases(&registry, &StatusOverrideTable::builtin(), &store()).unwrap_err();
    assert!(matches!(err, HarnessError::IdentityMismatch { .. }));
}

#[test]
fn test_allow_list_comes_from_store() {
    let mut store = store();
    store.set(keys::TEST_LANGUAGES, "python");
    let registry = DescriptorRegistry::new().with("SimpleMovingAverageAlgorithm", local_descriptor);

    let cases = generate_cases(&registry, &StatusOverrideTable::builtin(), &store).unwrap();
    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].language, Language::Python);

    store.set(keys::TEST_LANGUAGES, "Cobol");
    assert_eq!(
        generate_cases(&registry, &StatusOverrideTable::builtin(), &store).unwrap_err(),
        HarnessError::UnknownLanguage("Cobol".to_string())
    );
}

// =============================================================================
// FULL SUITE
// =============================================================================

#[test]
fn test_training_bucket_is_drained() {
    let registry = DescriptorRegistry::new().with("TrainingOnDataRegressionAlgorithm", training_descriptor);
    let cases = generate_cases(&registry, &StatusOverrideTable::builtin(), &store()).unwrap();

    let engine = BucketEngine::new();
    let overrides = OverrideRegistry::builtin("integration-token");
    let report = Runner::new(&engine, &overrides).run_suite(&cases, &mut store());

    // Capacity forced to 1, one token consumed
    assert!(report.passed(), "{}", report.format_summary());
    let seen = engine.seen.lock();
    assert_eq!(seen[0].get(keys::BUCKET_CAPACITY).map(String::as_str), Some("1"));
    assert_eq!(seen[0].get(keys::BUCKET_REFILL).map(String::as_str), Some("0"));
}

#[test]
fn test_training_bucket_left_over_fails() {
    let registry = DescriptorRegistry::new().with("TrainingOnDataRegressionAlgorithm", training_descriptor);
    let cases = generate_cases(&registry, &StatusOverrideTable::builtin(), &store()).unwrap();

    // Without the capacity override the engine keeps 59 tokens
    let engine = BucketEngine::new();
    let overrides = OverrideRegistry::new().with_depletion_check("TrainingOnDataRegressionAlgorithm");
    let report = Runner::new(&engine, &overrides).run_suite(&cases, &mut store());

    let outcome = report.outcome("CSharp/TrainingOnDataRegressionAlgorithm").unwrap();
    assert_eq!(outcome.reason(), "RemainingBucketTokens: expected 0, got 59");
}

#[test]
fn test_non_deterministic_counts_vary_freely() {
    let registry = DescriptorRegistry::new().with("TrainingOnDataRegressionAlgorithm", training_descriptor);
    let cases = generate_cases(&registry, &StatusOverrideTable::builtin(), &store()).unwrap();
    let overrides = OverrideRegistry::builtin("integration-token");

    for data_points in [0, 17, 9_999_999] {
        let engine =
            BucketEngine::new().with_data_points("TrainingOnDataRegressionAlgorithm", data_points);
        let report = Runner::new(&engine, &overrides).run_suite(&cases, &mut store());
        assert!(report.passed(), "{}", report.format_summary());
    }
}

#[test]
fn test_builtin_catalog_parallel_report_round_trips() {
    let base = store();
    let cases = generate_cases(&DescriptorRegistry::builtin(), &StatusOverrideTable::builtin(), &base).unwrap();
    let engine = BucketEngine::new();
    let overrides = OverrideRegistry::builtin("integration-token");

    let report = Runner::new(&engine, &overrides).run_suite_isolated(&cases, store);
    assert_eq!(report.cases.len(), cases.len());
    // Report order follows case order regardless of scheduling
    let ids: Vec<&str> = report.cases.iter().map(|c| c.id.as_str()).collect();
    let expected: Vec<String> = cases.iter().map(|c| c.id()).collect();
    assert_eq!(ids, expected);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    report.write_json(&path).unwrap();
    assert_eq!(SuiteReport::read_json(&path).unwrap(), report);
}

#[test]
fn test_expected_failure_status_flows_to_engine() {
    let cases = generate_cases(&DescriptorRegistry::builtin(), &StatusOverrideTable::builtin(), &store()).unwrap();
    let case = cases
        .iter()
        .find(|c| c.id() == "CSharp/LiquidateOnMarginCallRegression")
        .unwrap();
    assert_eq!(case.expected_status, AlgorithmStatus::Liquidated);
    assert_eq!(EngineRequest::for_case(case).expected_status, AlgorithmStatus::Liquidated);
}

// =============================================================================
// CLI
// =============================================================================

fn regression_run() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_regression_run"));
    command
        .env_remove("REGRESSION_CONFIG_PATH")
        .env_remove("REGRESSION_ENGINE")
        .env_remove("REGRESSION_DATA_ACCESS_TOKEN")
        .env("RUST_LOG", "off");
    command
}

fn write_settings(dir: &Path, engine: Option<&Path>) -> PathBuf {
    let mut contents = String::from("[defaults]\n\"regression-test-languages\" = \"CSharp\"\n");
    if let Some(engine) = engine {
        contents.push_str(&format!("\n[engine]\nprogram = {:?}\n", engine.display().to_string()));
    }
    let path = dir.join("regression.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_cli_list_prints_sorted_ids() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_settings(dir.path(), None);

    let output = regression_run()
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("list")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let ids: Vec<&str> = stdout.lines().filter(|l| l.contains('/')).collect();
    assert!(ids.contains(&"CSharp/BasicTemplateAlgorithm"));
    assert!(!ids.iter().any(|id| id.starts_with("Python/")));
    assert!(!ids.iter().any(|id| id.contains("RemoteCustomDataUniverseAlgorithm")));
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
}

#[test]
fn test_cli_without_engine_is_setup_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_settings(dir.path(), None);

    let output = regression_run()
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("run")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("No engine configured"));
}

#[test]
fn test_cli_unknown_language_is_setup_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_settings(dir.path(), None);

    let output = regression_run()
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("--languages")
        .arg("CSharp,Cobol")
        .arg("list")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[cfg(unix)]
fn write_launcher(dir: &Path, data_points: i64) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("launcher.sh");
    let script = format!(
        "#!/bin/sh\ncat > /dev/null\necho \"engine starting $*\"\n\
         echo '{{\"final_status\":\"Completed\",\"data_points\":{},\"history_data_points\":0}}'\n",
        data_points
    );
    std::fs::write(&path, script).unwrap();
    let mut permissions = std::fs::metadata(&path).unwrap().permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(&path, permissions).unwrap();
    path
}

#[cfg(unix)]
#[test]
fn test_cli_runs_launcher_and_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let launcher = write_launcher(dir.path(), 3943);
    let config = write_settings(dir.path(), Some(&launcher));
    let report_path = dir.path().join("out").join("report.json");

    let output = regression_run()
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("--algorithm")
        .arg("BasicTemplateAlgorithm")
        .arg("--output")
        .arg(&report_path)
        .arg("run")
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0), "{}", stdout);
    assert!(stdout.contains("[PASS] CSharp/BasicTemplateAlgorithm"));

    let report = SuiteReport::read_json(&report_path).unwrap();
    assert_eq!(report.cases.len(), 1);
    assert!(report.passed());
}

#[cfg(unix)]
#[test]
fn test_cli_mismatch_exits_with_failure() {
    let dir = tempfile::tempdir().unwrap();
    let launcher = write_launcher(dir.path(), 1);
    let config = write_settings(dir.path(), Some(&launcher));

    let output = regression_run()
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("--algorithm")
        .arg("BasicTemplateAlgorithm")
        .arg("run")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout)
        .contains("[FAIL] CSharp/BasicTemplateAlgorithm"));
    assert!(String::from_utf8_lossy(&output.stdout).contains("DataPoints: expected 3943, got 1"));
}

#[cfg(unix)]
#[test]
fn test_cli_env_token_applies_to_explicit_config() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    // Succeeds only when the request carries the token from the environment
    let launcher = dir.path().join("token_check.sh");
    std::fs::write(
        &launcher,
        "#!/bin/sh\n\
         if grep -q '\"external-data-access-token\":\"token-from-env\"'; then\n\
           echo '{\"final_status\":\"Completed\",\"data_points\":3943,\"history_data_points\":0}'\n\
         else\n\
           echo 'wrong data access token' >&2\n\
           exit 3\n\
         fi\n",
    )
    .unwrap();
    let mut permissions = std::fs::metadata(&launcher).unwrap().permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(&launcher, permissions).unwrap();

    let config = write_settings(dir.path(), Some(&launcher));
    let output = regression_run()
        .current_dir(dir.path())
        .env("REGRESSION_DATA_ACCESS_TOKEN", "token-from-env")
        .arg("--config")
        .arg(&config)
        .arg("run")
        .arg("--algorithm")
        .arg("BasicTemplateAlgorithm")
        .output()
        .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0), "{}", stdout);
    assert!(stdout.contains("[PASS] CSharp/BasicTemplateAlgorithm"));
}

