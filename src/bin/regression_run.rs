//! Regression Runner
//!
//! Generates the regression case list from the built-in catalog and runs every
//! case through the configured engine launcher.
//!
//! Usage (flags go before or after the subcommand):
//!   cargo run --release --bin regression_run -- list
//!   cargo run --release --bin regression_run -- --engine ./engine-launcher run
//!   cargo run --release --bin regression_run -- --languages CSharp --algorithm Training run --parallel
//!
//! Exit codes:
//!   0 - every case passed
//!   1 - at least one case failed or errored
//!   2 - setup error (settings, catalog, allow-list, missing engine)

use algo_regression::regression::{
    generate_cases, keys, CaseFilter, DescriptorRegistry, HarnessSettings, Language, Runner,
    StatusOverrideTable, TestCase,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Algorithm regression harness
#[derive(Parser, Debug)]
#[command(name = "regression_run")]
#[command(about = "Run every registered regression algorithm and verify its baseline")]
struct Cli {
    /// Settings file (defaults to $REGRESSION_CONFIG_PATH or ./regression.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Comma separated language allow-list, e.g. "CSharp,Python"
    #[arg(long, global = true)]
    languages: Option<String>,

    /// Only cases whose algorithm identity contains this text
    #[arg(short, long, global = true)]
    algorithm: Option<String>,

    /// Only cases for this language
    #[arg(short = 'L', long, global = true)]
    language: Option<String>,

    /// Engine launcher program (overrides the settings file)
    #[arg(long, env = "REGRESSION_ENGINE", global = true)]
    engine: Option<PathBuf>,

    /// Run cases in parallel, each with its own configuration store
    #[arg(long, global = true)]
    parallel: bool,

    /// Write the JSON report here
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the generated case identifiers without running anything
    List,

    /// Run and verify every case (default)
    Run,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };
    std::process::exit(code);
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "algo_regression=info,regression_run=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<i32> {
    let mut settings = HarnessSettings::from_env_with_path(cli.config.as_deref())
        .context("Failed to load settings")?;

    // Default rather than a one-off set, so every fresh store sees it too
    if let Some(languages) = &cli.languages {
        settings
            .defaults
            .insert(keys::TEST_LANGUAGES.to_string(), languages.clone());
    }

    let store = settings.config_store();
    let cases = generate_cases(
        &DescriptorRegistry::builtin(),
        &StatusOverrideTable::builtin(),
        &store,
    )
    .context("Failed to generate test cases")?;

    let filter = CaseFilter {
        algorithm: cli.algorithm.clone(),
        language: cli
            .language
            .as_deref()
            .map(str::parse::<Language>)
            .transpose()
            .context("Invalid --language")?,
    };
    let cases = filter.apply(cases);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::List => {
            print_cases(&cases);
            Ok(0)
        }
        Commands::Run => {
            if let Some(program) = cli.engine {
                settings.engine.program = Some(program);
            }
            let parallel = cli.parallel || settings.parallel;
            let output = cli.output.or_else(|| settings.report_path.clone());
            run_cases(&settings, &cases, parallel, output)
        }
    }
}

fn print_cases(cases: &[TestCase]) {
    for case in cases {
        println!("{}", case.id());
    }
    println!("\n{} case(s)", cases.len());
}

fn run_cases(
    settings: &HarnessSettings,
    cases: &[TestCase],
    parallel: bool,
    output: Option<PathBuf>,
) -> Result<i32> {
    let engine = settings
        .process_engine()
        .context("No engine configured: pass --engine or set [engine].program in the settings file")?;
    if cases.is_empty() {
        warn!("No test cases selected");
    }

    let overrides = settings.override_registry();
    let runner = Runner::new(&engine, &overrides);

    info!(
        cases = cases.len(),
        parallel,
        engine = %engine.program().display(),
        "Starting regression suite"
    );
    let report = if parallel {
        runner.run_suite_isolated(cases, || settings.config_store())
    } else {
        let mut store = settings.config_store();
        runner.run_suite(cases, &mut store)
    };

    println!("{}", report.format_summary());

    if let Some(path) = output {
        report
            .write_json(&path)
            .with_context(|| format!("Failed to write report: {:?}", path))?;
        info!(path = %path.display(), "Report written");
    }

    Ok(if report.passed() { 0 } else { 1 })
}
