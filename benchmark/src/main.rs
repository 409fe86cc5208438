//! @ai:module:intent CLI for the Apex rule benchmark
//! @ai:module:layer presentation

use anyhow::{Context, Result};
use apex_rules::Project;
use apex_rules_bench::{
    config::BenchmarkConfig,
    metrics::{check_performance_regressions, compare_with_baseline, load_baseline, RegressionCheck},
    report::{format_regression_check, format_results, JsonReporter, ReportGenerator},
    runner::{discover_fixtures, BenchmarkExecutor, PmdEngine},
    toolchain::ToolchainValidator,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "apex-rules-bench")]
#[command(about = "Measure execution time of PMD Apex rules and detect regressions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Benchmark every XML rule against the fixtures
    Run {
        /// Project root
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Report regressions without failing
        #[arg(long)]
        compare: bool,

        /// Save this run as the new baseline
        #[arg(long)]
        baseline: bool,
    },

    /// Compare a saved results file with the baseline
    Check {
        /// Results file, relative to the root
        #[arg(default_value = "benchmark-results.json")]
        results: PathBuf,

        /// Project root
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate reports from existing results
    Report {
        /// Path to results JSON file
        #[arg(short, long)]
        results: PathBuf,

        /// Output directory for reports
        #[arg(short, long, default_value = "benchmarks/reports")]
        output: PathBuf,
    },

    /// Initialize default configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "benchmark.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("apex_rules_bench=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            root,
            config,
            json,
            compare,
            baseline,
        } => {
            run_benchmarks(RunArgs {
                root,
                config,
                json,
                compare,
                baseline,
            })
            .await
        }
        Commands::Check { results, root, config } => check(&results, &root, config.as_deref()),
        Commands::Report { results, output } => generate_reports(&results, &output),
        Commands::Init { output } => init_config(&output),
    }
}

struct RunArgs {
    root: PathBuf,
    config: Option<PathBuf>,
    json: bool,
    compare: bool,
    baseline: bool,
}

/// @ai:intent Benchmark all rules, compare with the baseline and save the run
/// @ai:effects io, fs:read, fs:write
async fn run_benchmarks(args: RunArgs) -> Result<ExitCode> {
    let config = BenchmarkConfig::load_or_default(&args.root, args.config.as_deref())?;
    let project = Project::open(&args.root)?;

    let rules = project.xml_rules()?;
    let fixtures = discover_fixtures(&config.fixtures_dir(&args.root))?;
    if fixtures.is_empty() {
        tracing::warn!(
            "No benchmark fixtures found in {}",
            config.fixtures_dir(&args.root).display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    tracing::info!(
        "Benchmarking {} rules against {} fixtures ({} iterations each)",
        rules.len(),
        fixtures.len(),
        config.run.iterations
    );

    let toolchain_status = ToolchainValidator::validate(&config.pmd);
    ToolchainValidator::log_warnings(&toolchain_status);

    let engine = toolchain_status
        .pmd_available
        .then(|| Arc::new(PmdEngine::new(&config.pmd)));
    let executor = BenchmarkExecutor::new(engine, config.run.clone());
    let mut results = executor.execute_all(&rules, &fixtures).await;

    let baseline = load_baseline(&config.baseline_path(&args.root))?;
    compare_with_baseline(&mut results, baseline.as_ref(), config.run.regression_threshold);

    let saved = JsonReporter::new().save_run(&results, &config.results_dir(&args.root), args.baseline)?;
    tracing::info!("Results saved to {}", saved.display());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print!("{}", format_results(&results));
    }

    if !results.regressions.is_empty() && !args.compare {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// @ai:intent Check a saved results file, failing on regressions
/// @ai:effects fs:read
fn check(results: &Path, root: &Path, config_path: Option<&Path>) -> Result<ExitCode> {
    let root = root
        .canonicalize()
        .with_context(|| format!("Failed to resolve root {}", root.display()))?;
    let config = BenchmarkConfig::load_or_default(&root, config_path)?;

    let outcome = check_performance_regressions(
        &root,
        results,
        &config.baseline_path(&root),
        config.run.regression_threshold,
    )?;

    match &outcome {
        RegressionCheck::NoBaseline => {
            tracing::warn!("{}", format_regression_check(&outcome).trim_end());
            Ok(ExitCode::SUCCESS)
        }
        RegressionCheck::Passed => {
            print!("{}", format_regression_check(&outcome));
            Ok(ExitCode::SUCCESS)
        }
        RegressionCheck::Regressions(_) => {
            print!("{}", format_regression_check(&outcome));
            Ok(ExitCode::FAILURE)
        }
    }
}

/// @ai:intent Generate JSON, Markdown and chart reports from a results file
/// @ai:effects fs:read, fs:write
fn generate_reports(results_path: &Path, output: &Path) -> Result<ExitCode> {
    let results = JsonReporter::new().load(results_path)?;
    ReportGenerator::new().generate_all(&results, output)?;
    println!("Reports generated in {}", output.display());
    Ok(ExitCode::SUCCESS)
}

/// @ai:intent Write the default configuration
/// @ai:effects fs:write
fn init_config(output: &Path) -> Result<ExitCode> {
    BenchmarkConfig::default().save(output)?;
    println!("Configuration written to {}", output.display());
    Ok(ExitCode::SUCCESS)
}
