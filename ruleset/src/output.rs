//! @ai:module:intent Format reports for different formats (JSON, text)
//! @ai:module:layer infrastructure
//! @ai:module:public_api OutputFormat, format_validation, format_order_reports, format_xpath_coverage, format_rule_coverage, format_test_listing, format_violations, format_bump_summary, to_json
//! @ai:module:depends_on validate, order, xpath, coverage, test_listing, pmd, rule_bump
//! @ai:module:stateless true

use crate::coverage::RuleCoverageReport;
use crate::order::OrderReport;
use crate::pmd::Violation;
use crate::rule_bump::{BumpAction, BumpSummary};
use crate::test_listing::TestFileSummary;
use crate::validate::ValidationReport;
use crate::xpath::XPathCoverageReport;
use colored::Colorize;
use serde::Serialize;

/// @ai:intent Output format options
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
}

/// @ai:intent Serialize as JSON or fall back to the text renderer
/// @ai:effects pure
fn render<T: Serialize + ?Sized>(value: &T, format: OutputFormat, text: impl FnOnce(&T) -> String) -> String {
    match format {
        OutputFormat::Json => to_json(value, false),
        OutputFormat::JsonPretty => to_json(value, true),
        OutputFormat::Text => text(value),
    }
}

/// @ai:intent Format any serializable value as JSON
/// @ai:effects pure
pub fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(value).unwrap_or_default()
    } else {
        serde_json::to_string(value).unwrap_or_default()
    }
}

/// @ai:intent Format rule validation results
/// @ai:effects pure
pub fn format_validation(report: &ValidationReport, format: OutputFormat) -> String {
    render(report, format, format_validation_text)
}

fn format_validation_text(report: &ValidationReport) -> String {
    let mut output = String::new();

    if !report.warnings.is_empty() {
        output.push_str(&format!("{}\n", "Warnings:".yellow().bold()));
        for warning in &report.warnings {
            output.push_str(&format!("  - {}\n", warning));
        }
        output.push('\n');
    }

    if !report.errors.is_empty() {
        output.push_str(&format!("{}\n", "Errors:".red().bold()));
        for error in &report.errors {
            output.push_str(&format!("  - {}\n", error));
        }
        output.push('\n');
    }

    output.push_str(&format!("Checked {} rule files\n", report.files_checked));

    if !report.errors.is_empty() {
        output.push_str(&format!(
            "{} errors, {} warnings\n",
            report.errors.len().to_string().red().bold(),
            report.warnings.len().to_string().yellow()
        ));
    } else if report.warnings.is_empty() {
        output.push_str(&format!("{} All rules validated successfully!\n", "OK".green().bold()));
    } else {
        output.push_str(&format!(
            "{} {} warnings\n",
            "OK".green().bold(),
            report.warnings.len().to_string().yellow()
        ));
    }

    output
}

/// @ai:intent Format element order mismatches
/// @ai:effects pure
pub fn format_order_reports(reports: &[OrderReport], format: OutputFormat) -> String {
    render(reports, format, format_order_reports_text)
}

fn format_order_reports_text(reports: &[OrderReport]) -> String {
    if reports.is_empty() {
        return format!("{} All files have correct element order!\n", "OK".green().bold());
    }

    let mut output = format!("{}\n", "Files with incorrect element order:".red().bold());
    for report in reports {
        output.push_str(&format!("  {}\n", report.file.display().to_string().bold()));
        if let Some(rule) = &report.mismatch.rule {
            output.push_str(&format!("    Rule:     {}\n", rule.cyan()));
        }
        output.push_str(&format!("    Current:  [{}]\n", report.mismatch.order.join(", ")));
        output.push_str(&format!("    Expected: [{}]\n", report.mismatch.expected.join(", ")));
    }
    output
}

/// @ai:intent Format the XPath fixture coverage report
/// @ai:effects pure
pub fn format_xpath_coverage(report: &XPathCoverageReport, format: OutputFormat) -> String {
    render(report, format, format_xpath_coverage_text)
}

fn format_xpath_coverage_text(report: &XPathCoverageReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n\n", "XPath Coverage Report".bold()));
    output.push_str(&format!("Total XML Rules: {}\n", report.total_rules));
    output.push_str(&format!(
        "Fully Covered: {} ({:.1}%)\n",
        report.fully_covered,
        report.percent(report.fully_covered)
    ));
    output.push_str(&format!(
        "Partially Covered: {} ({:.1}%)\n",
        report.partially_covered,
        report.percent(report.partially_covered)
    ));
    output.push_str(&format!(
        "Not Covered: {} ({:.1}%)\n\n",
        report.not_covered,
        report.percent(report.not_covered)
    ));

    let mut issues = report.issues().peekable();
    if issues.peek().is_none() {
        output.push_str(&format!("{} All XPath expressions have full coverage!\n", "OK".green().bold()));
        return output;
    }

    output.push_str(&format!("{}\n\n", "Rules with coverage issues:".yellow().bold()));
    for result in issues {
        output.push_str(&format!("  {}/{}\n", result.category, result.rule_name.cyan()));
        if !result.message.is_empty() {
            output.push_str(&format!("    {}\n", result.message));
        }
        if !result.missing_node_types.is_empty() {
            output.push_str(&format!(
                "    Missing node types: {}\n",
                result.missing_node_types.join(", ").yellow()
            ));
        }
        output.push('\n');
    }

    output
}

/// @ai:intent Format which rules are referenced by tests
/// @ai:effects pure
pub fn format_rule_coverage(report: &RuleCoverageReport, format: OutputFormat) -> String {
    render(report, format, format_rule_coverage_text)
}

fn format_rule_coverage_text(report: &RuleCoverageReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n\n", "Rule Test Coverage Report".bold()));
    output.push_str(&format!("Total Rules: {}\n", report.total));
    output.push_str(&format!(
        "Rules with Tests: {} ({:.1}%)\n",
        report.covered.len(),
        report.percent(report.covered.len())
    ));
    output.push_str(&format!(
        "Rules without Tests: {} ({:.1}%)\n\n",
        report.uncovered.len(),
        report.percent(report.uncovered.len())
    ));

    if !report.uncovered.is_empty() {
        output.push_str(&format!("{}\n", "Rules without tests:".red().bold()));
        for rule in &report.uncovered {
            output.push_str(&format!("  - {}/{}\n", rule.category, rule.file));
        }
        output.push('\n');
    }

    if !report.covered.is_empty() {
        output.push_str(&format!("{}\n", "Rules with tests:".green().bold()));
        for rule in &report.covered {
            output.push_str(&format!("  - {}/{}\n", rule.category, rule.file.dimmed()));
        }
        output.push('\n');
    }

    output
}

/// @ai:intent Format the test file listing
/// @ai:effects pure
pub fn format_test_listing(files: &[TestFileSummary], format: OutputFormat) -> String {
    render(files, format, format_test_listing_text)
}

fn format_test_listing_text(files: &[TestFileSummary]) -> String {
    let rule = "─".repeat(50);
    let mut output = format!("Test files:\n{}\n", rule);

    for (index, file) in files.iter().enumerate() {
        output.push_str(&format!("{}. {}\n", index + 1, file.file.cyan()));
        output.push_str(&format!("   - Describes: {}\n", file.describes));
        output.push_str(&format!("   - Tests: {}\n", file.tests));
    }

    output.push_str(&format!("{}\nTotal: {} test files\n", rule, files.len()));
    output
}

/// @ai:intent Format rule violations from PMD or regex rules
/// @ai:effects pure
pub fn format_violations(violations: &[Violation], format: OutputFormat) -> String {
    render(violations, format, format_violations_text)
}

fn format_violations_text(violations: &[Violation]) -> String {
    let mut output = String::new();

    for violation in violations {
        let location = format!("{}:{}:{}", violation.file, violation.line, violation.column);
        output.push_str(&format!(
            "{} {} - {} ({})\n",
            "VIOLATION".red().bold(),
            location.dimmed(),
            violation.message,
            violation.rule.dimmed()
        ));
    }

    if violations.is_empty() {
        output.push_str(&format!("{} No violations found\n", "OK".green().bold()));
    } else {
        output.push_str(&format!("\n{} violations\n", violations.len().to_string().red().bold()));
    }

    output
}

/// @ai:intent Format the outcome of a rule version bump
/// @ai:effects pure
pub fn format_bump_summary(summary: &BumpSummary, format: OutputFormat) -> String {
    render(summary, format, format_bump_summary_text)
}

fn format_bump_summary_text(summary: &BumpSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Found {} rules with failing existing tests (major bump)\n",
        summary.failing_existing.len()
    ));
    output.push_str(&format!(
        "Found {} rules with new tests (minor bump)\n",
        summary.new_tests.len()
    ));
    output.push_str(&format!("Found {} changed rule files\n\n", summary.plans.len()));

    for plan in &summary.plans {
        let from = plan.from.as_deref().unwrap_or("-");
        let target = plan
            .target
            .map(|t| format!("Version: {}", t))
            .unwrap_or_else(|| "-".to_string());

        let line = match plan.action {
            BumpAction::Bump => format!("{} {}: {} -> {} ({})", "BUMP".green().bold(), plan.rule.cyan(), from, target, plan.kind),
            BumpAction::Fix => format!("{} {}: {} -> {} ({})", "FIX".yellow().bold(), plan.rule.cyan(), from, target, plan.kind),
            BumpAction::AlreadyBumped => format!("{} {}: already correctly bumped to {}", "SKIP".dimmed(), plan.rule.cyan(), from),
            BumpAction::MissingVersion => format!("{} {}: no version found in {}", "WARN".yellow().bold(), plan.rule.cyan(), plan.path.display()),
        };
        output.push_str(&line);
        output.push('\n');
    }

    output.push_str(&format!("\n{} Version bump complete:\n", "OK".green().bold()));
    output.push_str(&format!("   - Major bumps: {}\n", summary.major));
    output.push_str(&format!("   - Minor bumps: {}\n", summary.minor));
    output.push_str(&format!("   - Patch bumps: {}\n", summary.patch));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderMismatch;
    use crate::project::{RuleFile, RuleKind};
    use std::path::PathBuf;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_validation_text_success() {
        plain();
        let report = ValidationReport {
            files_checked: 3,
            ..Default::default()
        };
        let text = format_validation(&report, OutputFormat::Text);
        assert!(text.contains("Checked 3 rule files"));
        assert!(text.contains("All rules validated successfully!"));
    }

    #[test]
    fn test_validation_text_lists_errors() {
        plain();
        let report = ValidationReport {
            files_checked: 1,
            errors: vec!["a.xml: No ruleset element found".into()],
            warnings: vec!["No rules found in ruleset".into()],
        };
        let text = format_validation(&report, OutputFormat::Text);
        assert!(text.contains("  - a.xml: No ruleset element found"));
        assert!(text.contains("1 errors, 1 warnings"));
    }

    #[test]
    fn test_order_report_json_is_flattened() {
        let reports = vec![OrderReport {
            file: PathBuf::from("rulesets/naming/A.xml"),
            mismatch: OrderMismatch {
                rule: Some("A".into()),
                order: vec!["priority".into(), "description".into()],
                expected: vec!["description".into(), "priority".into()],
            },
        }];
        let json: serde_json::Value =
            serde_json::from_str(&format_order_reports(&reports, OutputFormat::Json)).unwrap();
        assert_eq!(json[0]["rule"], "A");
        assert_eq!(json[0]["expected"][0], "description");
    }

    #[test]
    fn test_rule_coverage_percentages_have_one_decimal() {
        plain();
        let rule = |name: &str| RuleFile {
            kind: RuleKind::Xml,
            category: "naming".into(),
            file: format!("{}.xml", name),
            name: name.into(),
            path: PathBuf::from(format!("rulesets/naming/{}.xml", name)),
        };
        let report = RuleCoverageReport {
            total: 2,
            covered: vec![rule("A")],
            uncovered: vec![rule("B")],
        };
        let text = format_rule_coverage(&report, OutputFormat::Text);
        assert!(text.contains("Rules with Tests: 1 (50.0%)"));
        assert!(text.contains("Rules without Tests: 1 (50.0%)"));
    }

    #[test]
    fn test_empty_violations_text() {
        plain();
        assert!(format_violations(&[], OutputFormat::Text).contains("No violations found"));
    }

    #[test]
    fn test_listing_text() {
        plain();
        let files = vec![TestFileSummary {
            file: "naming.test.js".into(),
            describes: 2,
            tests: 5,
        }];
        let text = format_test_listing(&files, OutputFormat::Text);
        assert!(text.contains("1. naming.test.js"));
        assert!(text.contains("   - Tests: 5"));
        assert!(text.contains("Total: 1 test files"));
    }
}
