//! @ai:module:intent Run the PMD CLI against Apex sources and read its XML report
//! @ai:module:layer infrastructure
//! @ai:module:public_api PmdRunner, Violation, parse_violations, parse_report, assert_violation, assert_no_violations, read_fixture
//! @ai:module:depends_on xml, project, error

use crate::config::PmdConfig;
use crate::error::{read_to_string, Error, Result};
use crate::project::{FixtureKind, Project};
use crate::xml::Document;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tracing::debug;

const VERSION_TIMEOUT: Duration = Duration::from_secs(2);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// @ai:intent A reported rule match
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Violation {
    pub file: String,
    pub rule: String,
    pub message: String,
    pub line: u32,
    pub column: u32,
}

/// @ai:intent Invokes the PMD command line tool
#[derive(Debug, Clone)]
pub struct PmdRunner {
    pub binary: String,
    pub timeout: Duration,
}

impl Default for PmdRunner {
    fn default() -> Self {
        Self::from_config(&PmdConfig::default())
    }
}

impl PmdRunner {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    pub fn from_config(config: &PmdConfig) -> Self {
        Self::new(config.binary.clone(), Duration::from_secs(config.timeout_secs))
    }

    /// @ai:intent Check whether the PMD binary can be executed
    /// @ai:effects io
    pub fn is_available(&self) -> bool {
        let child = Command::new(&self.binary)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match child {
            Ok(mut child) => matches!(wait_with_timeout(&mut child, VERSION_TIMEOUT), Ok(s) if s.success()),
            Err(e) => {
                debug!("PMD not available: {}", e);
                false
            }
        }
    }

    /// @ai:intent Run a ruleset against one Apex file and collect violations
    /// @ai:effects io, fs:write
    pub fn run(&self, ruleset: &Path, apex_file: &Path) -> Result<Vec<Violation>> {
        let report_dir = tempfile::TempDir::new()?;
        let report_path = report_dir.path().join("pmd-report.xml");

        let mut child = Command::new(&self.binary)
            .args(check_args(ruleset, apex_file, &report_path))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => Error::PmdUnavailable,
                _ => Error::Pmd(e.to_string()),
            })?;

        let status = wait_with_timeout(&mut child, self.timeout)?;
        let report = std::fs::read_to_string(&report_path).unwrap_or_default();

        // PMD exits non-zero when violations are found but still writes the report
        if report.trim().is_empty() {
            return Err(Error::Pmd(format!("PMD exited with {} and produced no report", status)));
        }

        parse_report(&report)
    }
}

/// @ai:intent Arguments for `pmd check` writing an XML report to a file
/// @ai:effects pure
pub fn check_args(ruleset: &Path, apex_file: &Path, report: &Path) -> Vec<OsString> {
    vec![
        "check".into(),
        "--no-cache".into(),
        "-d".into(),
        apex_file.as_os_str().to_owned(),
        "-R".into(),
        ruleset.as_os_str().to_owned(),
        "-f".into(),
        "xml".into(),
        "-r".into(),
        report.as_os_str().to_owned(),
    ]
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<ExitStatus> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if start.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::PmdTimeout(timeout.as_secs()));
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// @ai:intent Parse PMD output that may carry log noise before the XML
/// @ai:effects pure
pub fn parse_report(output: &str) -> Result<Vec<Violation>> {
    match output.find("<?xml") {
        Some(start) => parse_violations(&output[start..]),
        None => parse_violations(output),
    }
}

/// @ai:intent Extract violations from a PMD XML report
/// @ai:effects pure
pub fn parse_violations(xml: &str) -> Result<Vec<Violation>> {
    let doc = Document::parse(xml)?;
    let mut violations = Vec::new();

    for file in doc.elements("file") {
        let file_name = file.attr("name").unwrap_or_default();
        for node in file.descendants("violation") {
            let message = node
                .attr("message")
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| node.text_content().trim().to_string());
            violations.push(Violation {
                file: file_name.clone(),
                rule: node.attr("rule").unwrap_or_default(),
                message,
                line: parse_number(node.attr("beginline")),
                column: parse_number(node.attr("begincol")),
            });
        }
    }

    Ok(violations)
}

fn parse_number(value: Option<String>) -> u32 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

/// @ai:intent Require a violation of a rule at a line
/// @ai:effects pure
pub fn assert_violation(violations: &[Violation], rule: &str, line: u32) -> Result<()> {
    if violations.iter().any(|v| v.rule == rule && v.line == line) {
        return Ok(());
    }
    Err(Error::Assertion(format!(
        "Expected violation of rule \"{}\" at line {}, but found: {}",
        rule,
        line,
        serde_json::to_string(violations)?
    )))
}

/// @ai:intent Require that a rule reported nothing
/// @ai:effects pure
pub fn assert_no_violations(violations: &[Violation], rule: &str) -> Result<()> {
    let matching: Vec<&Violation> = violations.iter().filter(|v| v.rule == rule).collect();
    if matching.is_empty() {
        return Ok(());
    }
    Err(Error::Assertion(format!(
        "Expected no violations of rule \"{}\", but found: {}",
        rule,
        serde_json::to_string(&matching)?
    )))
}

/// @ai:intent Read a fixture source file for a rule
/// @ai:effects fs:read
pub fn read_fixture(project: &Project, category: &str, rule: &str, kind: FixtureKind) -> Result<String> {
    let path = project.fixture_path(kind, category, rule);
    if !path.is_file() {
        return Err(Error::FixtureNotFound(path));
    }
    read_to_string(&path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::fixtures::project_with;

    const REPORT: &str = r#"[WARN] Progressbar rendering disabled
<?xml version="1.0" encoding="UTF-8"?>
<pmd xmlns="http://pmd.sourceforge.net/report/2.0.0" version="7.0.0">
<file name="/tmp/Foo.cls">
<violation beginline="3" endline="3" begincol="9" endcol="20" rule="NoAbbreviations" ruleset="Naming" priority="3">
Avoid abbreviations
</violation>
<violation beginline="7" begincol="5" rule="NoMethodChaining" message="No chaining">
</violation>
</file>
</pmd>
"#;

    #[test]
    fn test_parse_report_strips_noise() {
        let violations = parse_report(REPORT).unwrap();
        assert_eq!(violations.len(), 2);
        assert_eq!(
            violations[0],
            Violation {
                file: "/tmp/Foo.cls".to_string(),
                rule: "NoAbbreviations".to_string(),
                message: "Avoid abbreviations".to_string(),
                line: 3,
                column: 9,
            }
        );
        assert_eq!(violations[1].message, "No chaining");
    }

    #[test]
    fn test_empty_report_has_no_violations() {
        let xml = r#"<?xml version="1.0"?><pmd version="7.0.0"></pmd>"#;
        assert!(parse_violations(xml).unwrap().is_empty());
    }

    #[test]
    fn test_assertions() {
        let violations = parse_report(REPORT).unwrap();
        assert!(assert_violation(&violations, "NoAbbreviations", 3).is_ok());

        let err = assert_violation(&violations, "NoAbbreviations", 4).unwrap_err();
        assert!(err.to_string().starts_with(
            "Expected violation of rule \"NoAbbreviations\" at line 4, but found: ["
        ));

        assert!(assert_no_violations(&violations, "Other").is_ok());
        assert!(assert_no_violations(&violations, "NoMethodChaining").is_err());
    }

    #[test]
    fn test_missing_binary_reports_unavailable() {
        let runner = PmdRunner::new("pmd-binary-that-does-not-exist", Duration::from_secs(1));
        assert!(!runner.is_available());

        let result = runner.run(Path::new("rules.xml"), Path::new("Foo.cls"));
        assert!(matches!(result, Err(Error::PmdUnavailable)));
    }

    #[test]
    fn test_read_fixture() {
        let (_dir, project) = project_with(&[(
            "tests/fixtures/positive/naming/NoAbbreviations.cls",
            "public class Ok {}",
        )]);

        let content =
            read_fixture(&project, "naming", "NoAbbreviations", FixtureKind::Positive).unwrap();
        assert_eq!(content, "public class Ok {}");

        let missing = read_fixture(&project, "naming", "NoAbbreviations", FixtureKind::Negative);
        assert!(matches!(missing, Err(Error::FixtureNotFound(_))));
    }
}
