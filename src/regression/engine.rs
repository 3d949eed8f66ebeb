//! Execution Engine
//!
//! The engine actually runs an algorithm and produces its statistics. The harness
//! only consumes the contract: given an identity, a language and the expectation
//! hints, return an `ExecutionResult`. Expectations are passed through so the
//! engine can soft-check statistics; the authoritative check is the verifier's.
//!
//! `ProcessEngine` speaks this contract to an external launcher over stdin/stdout:
//!
//! ```text
//! stdin  <- {"algorithm": ..., "language": ..., "expected_status": ..., "config": {...}}
//! stdout -> ... log lines ...
//!           {"final_status": "Completed", "data_points": 3943, ...}   (last non-empty line)
//! ```
//!
//! The launcher may ignore stdin and may write to stdout before reading it.
//!
//! Runs are long and blocking. The engine enforces its own wall-clock ceiling via
//! the configuration it receives; the harness does not cancel runs.

use crate::regression::cases::TestCase;
use crate::regression::config_store::ConfigStore;
use crate::regression::descriptor::AlphaStatistics;
use crate::regression::error::EngineError;
use crate::regression::language::Language;
use crate::regression::status::AlgorithmStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{ChildStdin, Command, Stdio};
use std::thread;
use tracing::debug;

/// Arguments of one engine run.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EngineRequest<'a> {
    pub algorithm: &'a str,
    pub language: Language,
    pub expected_statistics: &'a BTreeMap<String, String>,
    pub expected_alpha_statistics: Option<&'a AlphaStatistics>,
    pub expected_status: AlgorithmStatus,
}

impl<'a> EngineRequest<'a> {
    pub fn for_case(case: &'a TestCase) -> Self {
        Self {
            algorithm: &case.algorithm,
            language: case.language,
            expected_statistics: &case.expected_statistics,
            expected_alpha_statistics: case.expected_alpha_statistics.as_ref(),
            expected_status: case.expected_status,
        }
    }
}

/// What the engine reports after a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub final_status: AlgorithmStatus,
    pub data_points: i64,
    pub history_data_points: i32,
    /// Leaky-bucket tokens left at the end of the run, when the engine uses one.
    #[serde(default)]
    pub remaining_bucket_tokens: Option<i64>,
}

impl ExecutionResult {
    pub fn new(final_status: AlgorithmStatus, data_points: i64, history_data_points: i32) -> Self {
        Self {
            final_status,
            data_points,
            history_data_points,
            remaining_bucket_tokens: None,
        }
    }

    pub fn with_remaining_tokens(mut self, tokens: i64) -> Self {
        self.remaining_bucket_tokens = Some(tokens);
        self
    }
}

/// Runs one algorithm variant against the configuration it is handed.
pub trait ExecutionEngine: Send + Sync {
    fn run(
        &self,
        request: &EngineRequest<'_>,
        config: &dyn ConfigStore,
    ) -> Result<ExecutionResult, EngineError>;
}

/// Document written to the launcher's stdin.
#[derive(Debug, Serialize)]
struct LaunchDocument<'a> {
    #[serde(flatten)]
    request: &'a EngineRequest<'a>,
    config: BTreeMap<String, String>,
}

/// Engine backed by an external launcher program.
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    program: PathBuf,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl ProcessEngine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.args.extend(args);
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }
}

/// Parse the last non-empty stdout line as a result.
pub fn parse_result(stdout: &str) -> Result<ExecutionResult, EngineError> {
    let line = stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .ok_or_else(|| EngineError::Protocol("engine produced no output".to_string()))?;
    serde_json::from_str(line)
        .map_err(|e| EngineError::Protocol(format!("invalid result line '{}': {}", line, e)))
}

/// Write the request document and close stdin.
///
/// A launcher may exit without reading its stdin; the closed pipe is not an error.
fn write_request(mut stdin: ChildStdin, payload: &[u8]) -> io::Result<()> {
    match stdin.write_all(payload) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

/// Keep the tail of stderr for diagnostics.
fn stderr_tail(stderr: &[u8]) -> String {
    const MAX_LINES: usize = 20;
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(MAX_LINES);
    lines[start..].join("\n")
}

impl ExecutionEngine for ProcessEngine {
    fn run(
        &self,
        request: &EngineRequest<'_>,
        config: &dyn ConfigStore,
    ) -> Result<ExecutionResult, EngineError> {
        let document = LaunchDocument {
            request,
            config: config.snapshot(),
        };
        let payload = serde_json::to_vec(&document)
            .map_err(|e| EngineError::Protocol(format!("failed to encode request: {}", e)))?;

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg("--algorithm")
            .arg(request.algorithm)
            .arg("--language")
            .arg(request.language.as_str())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        debug!(
            program = %self.program.display(),
            algorithm = %request.algorithm,
            language = %request.language,
            "Launching engine"
        );
        let mut child = command.spawn().map_err(EngineError::Spawn)?;

        // Feed stdin while stdout is drained, so neither side blocks on a full pipe
        let writer = child
            .stdin
            .take()
            .map(|stdin| thread::spawn(move || write_request(stdin, &payload)));

        let output = child.wait_with_output().map_err(EngineError::Io)?;
        if !output.status.success() {
            return Err(EngineError::Exited {
                code: output.status.code(),
                stderr: stderr_tail(&output.stderr),
            });
        }
        if let Some(writer) = writer {
            writer
                .join()
                .map_err(|_| EngineError::Protocol("request writer panicked".to_string()))?
                .map_err(EngineError::Io)?;
        }

        parse_result(&String::from_utf8_lossy(&output.stdout))
    }
}
