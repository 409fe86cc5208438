//! @ai:module:intent Markdown report generation
//! @ai:module:layer infrastructure
//! @ai:module:public_api MarkdownReporter
//! @ai:module:stateless true

use crate::metrics::{BenchmarkResults, RuleBenchmark};
use anyhow::Result;
use std::fmt::Write as FmtWrite;
use std::path::Path;

const DISTRIBUTIONS_SHOWN: usize = 5;

/// @ai:intent Trait for Markdown report generation
pub trait MarkdownReporterTrait: Send + Sync {
    /// @ai:intent Generate Markdown report from results
    fn generate(&self, results: &BenchmarkResults, output_path: &Path) -> Result<()>;
}

/// @ai:intent Generates Markdown reports from benchmark results
pub struct MarkdownReporter;

impl MarkdownReporter {
    /// @ai:intent Create a new Markdown reporter
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Format a change against the baseline with sign
    /// @ai:effects pure
    fn format_delta(value: f64) -> String {
        if value >= 0.0 {
            format!("+{:.1}%", value)
        } else {
            format!("{:.1}%", value)
        }
    }

    fn status(rule: &RuleBenchmark) -> &'static str {
        if rule.regression {
            "Regression"
        } else {
            "OK"
        }
    }

    /// @ai:intent Generate overall summary section
    /// @ai:effects pure
    fn generate_summary(results: &BenchmarkResults) -> String {
        let mut output = String::new();

        writeln!(output, "# Apex Rule Benchmark Results").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "**Date:** {}", results.timestamp).unwrap();
        writeln!(output, "**Iterations per rule:** {}", results.iterations).unwrap();
        writeln!(output, "**Total time:** {:.2}ms", results.total_time).unwrap();
        writeln!(output, "**Baseline time:** {:.2}ms", results.baseline_time).unwrap();
        writeln!(output, "**Outliers removed:** {}", results.total_outliers()).unwrap();
        writeln!(output).unwrap();

        output
    }

    /// @ai:intent Generate per-rule timing table
    /// @ai:effects pure
    fn generate_rule_table(results: &BenchmarkResults) -> String {
        let mut output = String::new();

        writeln!(output, "## Rule Performance").unwrap();
        writeln!(output).unwrap();
        writeln!(
            output,
            "| Rule | Category | Mean (ms) | Median | StdDev | Min-Max | Violations | Status |"
        )
        .unwrap();
        writeln!(output, "|------|----------|-----------|--------|--------|---------|------------|--------|").unwrap();

        for rule in &results.rules {
            writeln!(
                output,
                "| {} | {} | {:.2} | {:.2} | {:.2} | {:.2}-{:.2} | {} | {} |",
                rule.name,
                rule.category,
                rule.execution_time,
                rule.execution_time_median,
                rule.execution_time_std_dev,
                rule.execution_time_min,
                rule.execution_time_max,
                rule.violations,
                Self::status(rule)
            )
            .unwrap();
        }

        writeln!(output).unwrap();
        output
    }

    /// @ai:intent Generate regression section, empty when the run is clean
    /// @ai:effects pure
    fn generate_regression_section(results: &BenchmarkResults) -> String {
        let mut output = String::new();
        if results.regressions.is_empty() {
            return output;
        }

        writeln!(output, "## Regressions").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "| Rule | Baseline (ms) | Current (ms) | Change |").unwrap();
        writeln!(output, "|------|---------------|--------------|--------|").unwrap();

        for regression in &results.regressions {
            writeln!(
                output,
                "| {} | {:.2} | {:.2} | {} |",
                regression.rule,
                regression.baseline_time,
                regression.current_time,
                Self::format_delta(regression.percent_change)
            )
            .unwrap();
        }

        writeln!(output).unwrap();
        output
    }

    /// @ai:intent Generate percentile details for the slowest rules
    /// @ai:effects pure
    fn generate_distribution_section(results: &BenchmarkResults) -> String {
        let mut output = String::new();

        writeln!(output, "## Slowest Rules").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "| Rule | P25 | P75 | P95 | Outliers |").unwrap();
        writeln!(output, "|------|-----|-----|-----|----------|").unwrap();

        for rule in results.slowest(DISTRIBUTIONS_SHOWN) {
            writeln!(
                output,
                "| {} | {:.2} | {:.2} | {:.2} | {} |",
                rule.name,
                rule.execution_time_p25,
                rule.execution_time_p75,
                rule.execution_time_p95,
                rule.outliers_removed
            )
            .unwrap();
        }

        writeln!(output).unwrap();
        output
    }
}

impl Default for MarkdownReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownReporterTrait for MarkdownReporter {
    /// @ai:intent Generate Markdown report to file
    /// @ai:effects fs:write
    fn generate(&self, results: &BenchmarkResults, output_path: &Path) -> Result<()> {
        let mut content = String::new();

        content.push_str(&Self::generate_summary(results));
        content.push_str(&Self::generate_rule_table(results));
        content.push_str(&Self::generate_regression_section(results));
        content.push_str(&Self::generate_distribution_section(results));

        std::fs::write(output_path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{Regression, Statistics};
    use tempfile::TempDir;

    #[test]
    fn test_format_delta_positive() {
        assert_eq!(MarkdownReporter::format_delta(12.5), "+12.5%");
    }

    #[test]
    fn test_format_delta_negative() {
        assert_eq!(MarkdownReporter::format_delta(-5.3), "-5.3%");
    }

    #[test]
    fn test_clean_run_has_no_regression_section() {
        let results = BenchmarkResults {
            rules: vec![RuleBenchmark::from_statistics("A", "naming", &Statistics::default(), 0)],
            ..Default::default()
        };
        assert!(MarkdownReporter::generate_regression_section(&results).is_empty());
    }

    #[test]
    fn test_generate_markdown_report() {
        let reporter = MarkdownReporter::new();
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("results.md");

        let mut rule = RuleBenchmark::from_statistics("NoMethodChaining", "design", &Statistics::default(), 3);
        rule.execution_time = 12.0;
        rule.regression = true;

        let results = BenchmarkResults {
            timestamp: "2026-01-19T00:00:00+00:00".to_string(),
            rules: vec![rule],
            total_time: 120.0,
            baseline_time: 100.0,
            iterations: 10,
            regressions: vec![Regression {
                rule: "NoMethodChaining".to_string(),
                baseline_time: 10.0,
                baseline_time_median: 10.0,
                baseline_time_std_dev: 0.0,
                current_time: 12.0,
                current_time_median: 12.0,
                current_time_std_dev: 0.0,
                percent_change: 20.0,
            }],
        };

        reporter.generate(&results, &output).unwrap();
        assert!(output.exists());

        let content = std::fs::read_to_string(&output).unwrap();
        assert!(content.contains("# Apex Rule Benchmark Results"));
        assert!(content.contains("| NoMethodChaining | design | 12.00 |"));
        assert!(content.contains("| Regression |"));
        assert!(content.contains("+20.0%"));
    }
}
