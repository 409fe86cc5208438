//! @ai:module:intent Bump rule versions from test results and git changes
//! @ai:module:layer application
//! @ai:module:public_api TestRunner, CommandTestRunner, failing_rules, rule_for_failing_test, existing_failing_rules, rules_with_new_tests, plan_rule_bump, bump_rule_versions, BumpSummary, PlannedBump, BumpAction
//! @ai:module:depends_on git, versioning, project
//!
//! Breaking a previously passing test is a major change, adding tests for a
//! changed rule is a minor change, any other edit to a rule is a patch.

use crate::error::{read_to_string, Result};
use crate::git::GitRepository;
use crate::project::Project;
use crate::versioning::{find_rule_version, replace_rule_version, BumpKind, RuleVersion, SemVer};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{info, warn};

static DESCRIBE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"describe\(['"]([^'"]+)['"]"#).unwrap());
static RULESET_IN_OUTPUT: Lazy<Regex> = Lazy::new(|| Regex::new(r"rulesets/([^/]+)/([^/]+)\.xml").unwrap());
static TEST_FILE_RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"tests/.*/(.*?)(_|\.)").unwrap());

/// @ai:intent Runs the project's test suite and returns its JSON report
pub trait TestRunner: Send + Sync {
    fn run_json(&self) -> Result<String>;
}

/// @ai:intent TestRunner executing a configured shell-free command line
#[derive(Debug, Clone)]
pub struct CommandTestRunner {
    root: PathBuf,
    command: String,
}

impl CommandTestRunner {
    pub fn new(root: impl Into<PathBuf>, command: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            command: command.into(),
        }
    }
}

impl TestRunner for CommandTestRunner {
    /// @ai:effects io
    fn run_json(&self) -> Result<String> {
        let mut parts = self.command.split_whitespace();
        let program = parts.next().unwrap_or("pnpm");
        let output = Command::new(program)
            .args(parts)
            .current_dir(&self.root)
            .output()?;

        // Failing suites exit non-zero but still print the report
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if stdout.trim().is_empty() {
            Ok(String::from_utf8_lossy(&output.stderr).into_owned())
        } else {
            Ok(stdout)
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JestReport {
    #[serde(default)]
    test_results: Vec<JestSuite>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JestSuite {
    name: String,
    #[serde(default)]
    assertion_results: Vec<JestAssertion>,
}

#[derive(Debug, Deserialize)]
struct JestAssertion {
    status: String,
    #[serde(default)]
    title: Option<String>,
}

/// @ai:intent Innermost rule-level describe enclosing a failing test
/// @ai:effects pure
pub fn rule_for_failing_test(content: &str, title: Option<&str>) -> Option<String> {
    let mut stack: Vec<String> = Vec::new();

    for line in content.split('\n') {
        if let Some(captures) = DESCRIBE.captures(line) {
            let name = &captures[1];
            if !name.ends_with("Rules") && !name.contains(" - ") {
                stack.push(name.to_string());
            }
        }

        if let Some(title) = title.filter(|t| !t.is_empty()) {
            if line.contains(&format!("it('{}'", title)) || line.contains(&format!("it(\"{}\"", title)) {
                return stack.last().cloned();
            }
        }

        if line.trim() == "});" {
            stack.pop();
        }
    }

    stack.last().cloned()
}

/// @ai:intent Rules whose tests fail according to a Jest JSON report
/// @ai:effects pure
pub fn failing_rules<F>(output: &str, read_file: F) -> BTreeSet<String>
where
    F: Fn(&Path) -> Option<String>,
{
    let mut failing = BTreeSet::new();

    let (Some(start), Some(end)) = (output.find('{'), output.rfind('}')) else {
        return failing;
    };
    if end < start {
        return failing;
    }

    let report: JestReport = match serde_json::from_str(&output[start..=end]) {
        Ok(report) => report,
        Err(_) => {
            for captures in RULESET_IN_OUTPUT.captures_iter(output) {
                failing.insert(captures[2].to_string());
            }
            return failing;
        }
    };

    for suite in &report.test_results {
        for assertion in suite.assertion_results.iter().filter(|a| a.status == "failed") {
            let Some(content) = read_file(Path::new(&suite.name)) else {
                continue;
            };
            if let Some(rule) = rule_for_failing_test(&content, assertion.title.as_deref()) {
                failing.insert(rule);
            }
        }
    }

    failing
}

fn describes_rule(content: &str, rule: &str) -> bool {
    content.contains(&format!("describe('{}'", rule)) || content.contains(&format!("describe(\"{}\"", rule))
}

/// @ai:intent Failing rules whose tests or fixtures already existed at HEAD
/// @ai:effects io
pub fn existing_failing_rules(
    project: &Project,
    git: &dyn GitRepository,
    failing: &BTreeSet<String>,
) -> BTreeSet<String> {
    let mut existing = BTreeSet::new();
    if failing.is_empty() {
        return existing;
    }

    let tests_root = tests_root(project);
    let files = match git.files_at_head(&format!("{}/", tests_root)) {
        Ok(files) => files,
        Err(e) => {
            warn!("Could not get test files from HEAD: {}", e);
            return existing;
        }
    };

    let suffix = &project.config.tests.suffix;
    let test_suites: Vec<&String> = files.iter().filter(|f| f.ends_with(suffix.as_str())).collect();

    for rule in failing {
        let has_fixture = files.iter().any(|f| {
            f.ends_with(".cls") && (f.contains(&format!("/{}.cls", rule)) || f.contains(&format!("/{}_", rule)))
        });

        let in_suite = has_fixture
            || test_suites.iter().any(|suite| {
                let content = match git.show_head(suite) {
                    Ok(Some(content)) => Some(content),
                    _ => std::fs::read_to_string(project.root.join(suite.as_str())).ok(),
                };
                content.map(|c| describes_rule(&c, rule)).unwrap_or(false)
            });

        if in_suite {
            existing.insert(rule.clone());
        }
    }

    existing
}

/// Top-level directory holding tests and fixtures, `tests` by default
fn tests_root(project: &Project) -> String {
    project
        .config
        .paths
        .tests_dir
        .components()
        .next()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .unwrap_or_else(|| "tests".to_string())
}

/// @ai:intent Changed rules that also gained new or modified test files
/// @ai:effects pure
pub fn rules_with_new_tests(status_lines: &[String], changed_rules: &BTreeSet<String>) -> BTreeSet<String> {
    status_lines
        .iter()
        .filter(|line| line.contains("tests/") && (line.starts_with("??") || line.starts_with(" M")))
        .filter_map(|line| TEST_FILE_RULE.captures(line).map(|c| c[1].to_string()))
        .map(|name| name.split('_').next().unwrap_or_default().to_string())
        .filter(|name| changed_rules.contains(name))
        .collect()
}

/// @ai:intent A changed rule file with its working tree and HEAD content
#[derive(Debug, Clone)]
pub struct ChangedRule {
    pub name: String,
    pub path: PathBuf,
    pub content: String,
    pub head_content: Option<String>,
}

/// @ai:intent What happens to a changed rule file
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BumpAction {
    /// Version unchanged since HEAD, bumped now
    Bump,
    /// Version already edited but not to the expected target
    Fix,
    /// Version already edited to the expected target
    AlreadyBumped,
    /// No `Version:` marker in the file
    MissingVersion,
}

/// @ai:intent Planned version change for one rule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlannedBump {
    pub rule: String,
    pub path: PathBuf,
    pub kind: BumpKind,
    pub action: BumpAction,
    pub from: Option<String>,
    pub head: Option<String>,
    pub target: Option<SemVer>,
}

/// @ai:intent Decide the version change for every changed rule
/// @ai:effects pure
pub fn plan_rule_bump(
    changed: &[ChangedRule],
    failing_existing: &BTreeSet<String>,
    new_tests: &BTreeSet<String>,
) -> Vec<PlannedBump> {
    changed
        .iter()
        .map(|rule| {
            let kind = if failing_existing.contains(&rule.name) {
                BumpKind::Major
            } else if new_tests.contains(&rule.name) {
                BumpKind::Minor
            } else {
                BumpKind::Patch
            };

            let Some(current) = find_rule_version(&rule.content) else {
                return PlannedBump {
                    rule: rule.name.clone(),
                    path: rule.path.clone(),
                    kind,
                    action: BumpAction::MissingVersion,
                    from: None,
                    head: None,
                    target: None,
                };
            };

            let head: Option<RuleVersion> = rule.head_content.as_deref().and_then(find_rule_version);
            let base = head.as_ref().map(|h| h.version).unwrap_or(current.version);
            let target = base.bump(kind);

            let action = match &head {
                Some(head) if head.text != current.text => {
                    if current.version == target {
                        BumpAction::AlreadyBumped
                    } else {
                        BumpAction::Fix
                    }
                }
                _ => BumpAction::Bump,
            };

            PlannedBump {
                rule: rule.name.clone(),
                path: rule.path.clone(),
                kind,
                action,
                from: Some(current.text),
                head: head.map(|h| h.text),
                target: Some(target),
            }
        })
        .collect()
}

/// @ai:intent Outcome of a rule version bump run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BumpSummary {
    pub failing_existing: Vec<String>,
    pub new_tests: Vec<String>,
    pub plans: Vec<PlannedBump>,
    pub major: usize,
    pub minor: usize,
    pub patch: usize,
}

impl BumpSummary {
    fn count(&mut self, kind: BumpKind) {
        match kind {
            BumpKind::Major => self.major += 1,
            BumpKind::Minor => self.minor += 1,
            BumpKind::Patch => self.patch += 1,
        }
    }
}

/// @ai:intent Run tests, inspect git state and rewrite rule versions
/// @ai:effects io, fs:read, fs:write
pub fn bump_rule_versions(
    project: &Project,
    git: &dyn GitRepository,
    tests: &dyn TestRunner,
) -> Result<BumpSummary> {
    info!("Running tests to check for failures...");
    let output = tests.run_json().unwrap_or_else(|e| {
        warn!("Could not run tests: {}", e);
        String::new()
    });
    let failing = failing_rules(&output, |path| std::fs::read_to_string(path).ok());
    let failing_existing = existing_failing_rules(project, git, &failing);

    let rules_prefix = format!("{}/", project.config.paths.rulesets_dir.display());
    let changed_paths: Vec<String> = git
        .changed_files()?
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| line.contains(&rules_prefix) && line.ends_with(".xml"))
        .collect();

    let changed_names: BTreeSet<String> = changed_paths.iter().map(|p| rule_name(p)).collect();
    let new_tests = rules_with_new_tests(&git.status_short()?, &changed_names);

    let mut changed = Vec::new();
    for relative in &changed_paths {
        let path = project.root.join(relative);
        if !path.is_file() {
            continue;
        }
        changed.push(ChangedRule {
            name: rule_name(relative),
            content: read_to_string(&path)?,
            head_content: git.show_head(relative)?,
            path,
        });
    }

    let plans = plan_rule_bump(&changed, &failing_existing, &new_tests);
    let mut summary = BumpSummary {
        failing_existing: failing_existing.into_iter().collect(),
        new_tests: new_tests.into_iter().collect(),
        ..Default::default()
    };

    for (plan, rule) in plans.iter().zip(&changed) {
        match plan.action {
            BumpAction::Bump | BumpAction::Fix => {
                let (Some(target), Some(current)) = (plan.target, find_rule_version(&rule.content)) else {
                    continue;
                };
                std::fs::write(&rule.path, replace_rule_version(&rule.content, &current, target))?;
                summary.count(plan.kind);
            }
            BumpAction::MissingVersion => warn!("No version found in {}", rule.path.display()),
            BumpAction::AlreadyBumped => {}
        }
    }

    summary.plans = plans;
    Ok(summary)
}

fn rule_name(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
