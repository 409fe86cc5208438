//! @ai:module:intent Tooling library for repositories of PMD Apex rules
//! @ai:module:layer infrastructure
//! @ai:module:public_api project, validate, order, version_info, xpath, coverage, lcov, test_ruleset, clean, test_listing, pmd, regex_rules, versioning, rule_bump, changelog, output, error
//! @ai:module:stateless true
//!
//! # Apex Rules
//!
//! Validation, coverage and maintenance tasks for a repository of PMD XPath
//! rules (`rulesets/<category>/<Rule>.xml`) and regex rules
//! (`code-analyzer.yml`), with Jest tests and Apex fixtures beside them.
//!
//! ## Example
//!
//! ```rust,no_run
//! use apex_rules::{coverage, output, validate, Project};
//!
//! let project = Project::open(".").unwrap();
//!
//! // Validate every XML rule
//! let report = validate::validate_rules(&project).unwrap();
//! println!("{}", output::format_validation(&report, output::OutputFormat::Text));
//!
//! // Which rules are referenced by tests
//! let coverage = coverage::check_rule_coverage(&project).unwrap();
//! println!("{}", output::format_rule_coverage(&coverage, output::OutputFormat::JsonPretty));
//! ```

pub mod changelog;
pub mod clean;
pub mod config;
pub mod coverage;
pub mod error;
pub mod git;
pub mod lcov;
pub mod order;
pub mod output;
pub mod pmd;
pub mod project;
pub mod regex_rules;
pub mod rule_bump;
pub mod ruleset;
pub mod test_listing;
pub mod test_ruleset;
pub mod validate;
pub mod version_info;
pub mod versioning;
pub mod xml;
pub mod xpath;

pub use changelog::{generate_changelog, ChangeType, Commit};
pub use clean::{clean, find_generated_files};
pub use config::{PathConfig, PmdConfig, ProjectConfig, TestConfig, CONFIG_FILE};
pub use coverage::{check_rule_coverage, collect_tested_rules, RuleCoverageReport};
pub use error::{Error, Result};
pub use git::{CommandGit, GitRepository};
pub use lcov::{generate_lcov, LcovSummary};
pub use order::{check_element_order, fix_element_order, OrderMismatch, OrderReport};
pub use output::{
    format_bump_summary, format_order_reports, format_rule_coverage, format_test_listing,
    format_validation, format_violations, format_xpath_coverage, to_json, OutputFormat,
};
pub use pmd::{PmdRunner, Violation};
pub use project::{FixtureKind, Project, RuleFile, RuleKind};
pub use regex_rules::{run_regex_rules, CodeAnalyzerConfig, RegexRule};
pub use rule_bump::{bump_rule_versions, plan_rule_bump, BumpSummary, CommandTestRunner, TestRunner};
pub use test_listing::{list_test_files, TestFileSummary};
pub use test_ruleset::generate_test_ruleset;
pub use validate::{validate_rules, ValidationReport};
pub use version_info::add_version_info;
pub use versioning::{bump_package_version, BumpKind, SemVer};
pub use xpath::{check_xpath_coverage, XPathCoverageReport};
