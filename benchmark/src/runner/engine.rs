//! @ai:module:intent Rule engines that report violations for a ruleset and an Apex file
//! @ai:module:layer infrastructure
//! @ai:module:public_api RuleEngineTrait, PmdEngine, MockRuleEngine
//! @ai:module:stateless true

use crate::config::PmdSettings;
use anyhow::{bail, Context, Result};
use apex_rules::pmd::{check_args, parse_report};
use apex_rules::Violation;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// @ai:intent Runs one ruleset against one Apex file
#[allow(async_fn_in_trait)]
pub trait RuleEngineTrait: Send + Sync {
    /// @ai:intent Violations reported for the file
    async fn violations(&self, ruleset: &Path, apex_file: &Path) -> Result<Vec<Violation>>;
}

/// @ai:intent PMD CLI engine driven through tokio processes
#[derive(Debug, Clone)]
pub struct PmdEngine {
    binary: String,
    timeout: Duration,
}

impl PmdEngine {
    /// @ai:intent Create an engine from PMD settings
    /// @ai:effects pure
    pub fn new(settings: &PmdSettings) -> Self {
        Self {
            binary: settings.binary.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

impl RuleEngineTrait for PmdEngine {
    /// @ai:intent Run `pmd check` writing its XML report to a temporary file
    /// @ai:effects io, fs:write
    async fn violations(&self, ruleset: &Path, apex_file: &Path) -> Result<Vec<Violation>> {
        let report_dir = tempfile::TempDir::new()?;
        let report_path = report_dir.path().join("pmd-report.xml");

        tracing::debug!("Running {} on {}", self.binary, apex_file.display());

        let child = Command::new(&self.binary)
            .args(check_args(ruleset, apex_file, &report_path))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn {}", self.binary))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .with_context(|| format!("PMD timed out after {}s", self.timeout.as_secs()))?
            .context("Failed to wait for PMD")?;

        // Non-zero exit is expected when violations are found
        let report = tokio::fs::read_to_string(&report_path).await.unwrap_or_default();
        if report.trim().is_empty() {
            bail!("PMD exited with {} and produced no report", output.status);
        }

        Ok(parse_report(&report)?)
    }
}

/// @ai:intent Engine returning canned results, failing for configured files
#[derive(Debug, Clone, Default)]
pub struct MockRuleEngine {
    pub violations_per_file: usize,
    pub failing_files: Vec<String>,
}

impl RuleEngineTrait for MockRuleEngine {
    async fn violations(&self, ruleset: &Path, apex_file: &Path) -> Result<Vec<Violation>> {
        let file = apex_file.display().to_string();
        if self.failing_files.iter().any(|f| file.ends_with(f.as_str())) {
            bail!("mock failure for {}", file);
        }

        let rule = ruleset
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok((0..self.violations_per_file)
            .map(|i| Violation {
                file: file.clone(),
                rule: rule.clone(),
                message: "mock".to_string(),
                line: i as u32 + 1,
                column: 1,
            })
            .collect())
    }
}
