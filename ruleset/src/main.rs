//! @ai:module:intent CLI entry point for Apex rule repository tooling
//! @ai:module:layer presentation
//! @ai:module:public_api main
//! @ai:module:depends_on validate, order, xpath, coverage, output

use apex_rules::{
    changelog, clean, coverage, lcov, order, output, pmd, regex_rules, rule_bump, test_listing,
    test_ruleset, validate, version_info, versioning, xpath, BumpKind, CommandGit, CommandTestRunner,
    OutputFormat, PmdRunner, Project, ProjectConfig, CONFIG_FILE,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "apex-rules")]
#[command(author, version, about = "Validation, coverage and maintenance tools for PMD Apex rules")]
struct Cli {
    /// Repository root containing rulesets/ and tests/
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Output format
    #[arg(long, short, global = true, value_enum, default_value = "text")]
    format: Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the structure of every XML rule
    Validate,

    /// Check the element order of every rule
    CheckOrder,

    /// Rewrite rules whose elements are out of order
    FixOrder,

    /// Add initial version information to rule descriptions
    AddVersion,

    /// Check that fixtures exercise the node types used by each XPath
    XpathCoverage,

    /// Check which rules are referenced by tests, then XPath coverage and lcov
    Coverage,

    /// Write coverage/lcov.info
    Lcov,

    /// Combine every XML rule into one test ruleset
    TestRuleset,

    /// Remove generated .ast.xml and .override.xml files
    Clean,

    /// List test files with describe and test counts
    ListTests,

    /// Run a ruleset against an Apex file through PMD
    Run {
        /// Ruleset XML file
        ruleset: PathBuf,

        /// Apex source file
        apex_file: PathBuf,
    },

    /// Run the regex rules from code-analyzer.yml against files
    Regex {
        /// Files to check
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Only run this rule
        #[arg(long)]
        rule: Option<String>,
    },

    /// Bump the package version (major, minor or patch)
    Bump {
        /// Bump kind
        kind: String,
    },

    /// Bump versions of changed rules from test and git state
    BumpRules,

    /// Generate CHANGELOG.md from the git log
    Changelog,

    /// Write a default apex-rules.toml
    Init {
        /// Overwrite an existing file
        #[arg(long, default_value = "false")]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    JsonPretty,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

fn init_tracing() {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "apex_rules=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// @ai:intent Dispatch a subcommand, mapping check failures to exit code 1
/// @ai:effects io, fs:read, fs:write
fn run(cli: Cli) -> apex_rules::Result<ExitCode> {
    let format: OutputFormat = cli.format.into();

    if let Commands::Init { force } = cli.command {
        return init_config(cli.root, force);
    }
    if let Commands::Clean = cli.command {
        return clean_generated(cli.root);
    }

    let project = Project::open(&cli.root)?;

    match cli.command {
        Commands::Validate => {
            let report = validate::validate_rules(&project)?;
            println!("{}", output::format_validation(&report, format));
            Ok(exit_if(!report.passed()))
        }

        Commands::CheckOrder => {
            let reports = order::check_element_order(&project)?;
            println!("{}", output::format_order_reports(&reports, format));
            Ok(exit_if(!reports.is_empty()))
        }

        Commands::FixOrder => {
            let fixed = order::fix_element_order(&project)?;
            for path in &fixed {
                info!("Fixed {}", project.relative(path).display());
            }
            println!("Fixed {} files", fixed.len());
            Ok(ExitCode::SUCCESS)
        }

        Commands::AddVersion => {
            let updated = version_info::add_version_info(&project)?;
            for path in &updated {
                info!("Updated {}", project.relative(path).display());
            }
            println!("Updated {} files", updated.len());
            Ok(ExitCode::SUCCESS)
        }

        Commands::XpathCoverage => {
            let report = xpath::check_xpath_coverage(&project)?;
            println!("{}", output::format_xpath_coverage(&report, format));
            Ok(ExitCode::from(report.exit_code()))
        }

        Commands::Coverage => {
            let report = coverage::check_rule_coverage(&project)?;
            println!("{}", output::format_rule_coverage(&report, format));

            info!("Checking XPath coverage for XML rules...");
            let xpath_report = xpath::check_xpath_coverage(&project)?;
            println!("{}", output::format_xpath_coverage(&xpath_report, format));

            let summary = lcov::generate_lcov(&project)?;
            info!(
                "Generated {} ({} of {} rules, {:.1}%)",
                project.relative(&summary.path).display(),
                summary.covered,
                summary.total_rules,
                summary.percent
            );

            if !report.passed() {
                Ok(ExitCode::FAILURE)
            } else {
                Ok(ExitCode::from(xpath_report.exit_code()))
            }
        }

        Commands::Lcov => {
            let summary = lcov::generate_lcov(&project)?;
            match format {
                OutputFormat::Text => println!(
                    "Generated {}\nCoverage: {}/{} rules ({:.1}%)",
                    project.relative(&summary.path).display(),
                    summary.covered,
                    summary.total_rules,
                    summary.percent
                ),
                _ => println!("{}", output::to_json(&summary, matches!(format, OutputFormat::JsonPretty))),
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::TestRuleset => {
            let (path, count) = test_ruleset::generate_test_ruleset(&project)?;
            println!("Generated {} with {} rules", project.relative(&path).display(), count);
            Ok(ExitCode::SUCCESS)
        }

        Commands::ListTests => {
            let files = test_listing::list_test_files(&project)?;
            println!("{}", output::format_test_listing(&files, format));
            Ok(ExitCode::SUCCESS)
        }

        Commands::Run { ruleset, apex_file } => {
            let runner = PmdRunner::from_config(&project.config.pmd);
            let violations = runner.run(&ruleset, &apex_file)?;
            println!("{}", output::format_violations(&violations, format));
            Ok(exit_if(!violations.is_empty()))
        }

        Commands::Regex { paths, rule } => {
            let Some(config) = project.code_analyzer()? else {
                println!("No regex rules configured in {}", project.config.paths.code_analyzer.display());
                return Ok(ExitCode::SUCCESS);
            };

            let mut violations: Vec<pmd::Violation> = Vec::new();
            match rule {
                Some(name) => {
                    for path in &paths {
                        violations.extend(regex_rules::run_regex_rule(&config, &name, path)?);
                    }
                }
                None => violations = regex_rules::run_regex_rules(&config, &paths)?,
            }

            println!("{}", output::format_violations(&violations, format));
            Ok(exit_if(!violations.is_empty()))
        }

        Commands::Bump { kind } => {
            let kind: BumpKind = kind.parse()?;
            let version = versioning::bump_package_version(&project.package_manifest(), kind)?;
            println!("Bumped version to {}", version);
            Ok(ExitCode::SUCCESS)
        }

        Commands::BumpRules => {
            let git = CommandGit::new(&project.root);
            let tests = CommandTestRunner::new(&project.root, project.config.tests.command.clone());
            let summary = rule_bump::bump_rule_versions(&project, &git, &tests)?;
            println!("{}", output::format_bump_summary(&summary, format));
            Ok(ExitCode::SUCCESS)
        }

        Commands::Changelog => {
            let git = CommandGit::new(&project.root);
            let today = chrono::Local::now().date_naive();
            let path = changelog::generate_changelog(&project, &git, today)?;
            println!("Generated {}", project.relative(&path).display());
            Ok(ExitCode::SUCCESS)
        }

        Commands::Init { .. } | Commands::Clean => Ok(ExitCode::SUCCESS),
    }
}

fn exit_if(failed: bool) -> ExitCode {
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// @ai:intent Remove generated files below the root and report them
/// @ai:effects fs:write
fn clean_generated(root: PathBuf) -> apex_rules::Result<ExitCode> {
    let removed = clean::clean(&root)?;

    if removed.is_empty() {
        println!("No files to clean.");
        return Ok(ExitCode::SUCCESS);
    }

    println!("Removed {} file(s):", removed.len());
    for path in &removed {
        println!("  - {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}

/// @ai:intent Write a default configuration file
/// @ai:effects fs:write
fn init_config(root: PathBuf, force: bool) -> apex_rules::Result<ExitCode> {
    let path = root.join(CONFIG_FILE);

    if path.exists() && !force {
        eprintln!("{} already exists, use --force to overwrite", path.display());
        return Ok(ExitCode::FAILURE);
    }

    ProjectConfig::default().save(&path)?;
    println!("Created {}", path.display());
    Ok(ExitCode::SUCCESS)
}
