//! @ai:module:intent Console tables for benchmark runs and regression checks
//! @ai:module:layer presentation
//! @ai:module:public_api format_results, format_regression_check
//! @ai:module:stateless true

use crate::metrics::{BenchmarkResults, RegressionCheck};

const WIDTH: usize = 120;
const SLOWEST_SHOWN: usize = 5;

/// @ai:intent Rule table, totals, regressions and the slowest rules' distributions
/// @ai:effects pure
pub fn format_results(results: &BenchmarkResults) -> String {
    let rule_line = "─".repeat(WIDTH);
    let mut output = String::new();

    output.push_str("\nBenchmark Results\n\n");
    output.push_str("Rule Performance (after removing outliers):\n");
    output.push_str(&format!("{}\n", rule_line));
    output.push_str(&format!(
        "{:<35} {:<12} {:<12} {:<12} {:<15} {:<12} Status\n",
        "Rule", "Mean (ms)", "Median", "StdDev", "Min-Max", "Violations"
    ));
    output.push_str(&format!("{}\n", rule_line));

    for rule in &results.rules {
        let min_max = format!("{:.2}-{:.2}", rule.execution_time_min, rule.execution_time_max);
        output.push_str(&format!(
            "{:<35} {:<12} {:<12} {:<12} {:<15} {:<12} {}\n",
            rule.name,
            format!("{:.2}", rule.execution_time),
            format!("{:.2}", rule.execution_time_median),
            format!("{:.2}", rule.execution_time_std_dev),
            min_max,
            rule.violations,
            if rule.regression { "Regression" } else { "OK" }
        ));
    }

    output.push_str(&format!("{}\n", rule_line));
    output.push_str(&format!("Total Time: {:.2}ms\n", results.total_time));
    output.push_str(&format!("Baseline Time: {:.2}ms\n", results.baseline_time));
    output.push_str(&format!("Iterations per rule: {}\n", results.iterations));

    let outliers = results.total_outliers();
    if outliers > 0 {
        output.push_str(&format!("\nOutliers removed: {} total across all rules\n", outliers));
    }

    if !results.regressions.is_empty() {
        output.push_str("\nPerformance Regressions Detected (comparing means after outlier removal):\n");
        for regression in &results.regressions {
            output.push_str(&format!("  - {}: {}% slower\n", regression.rule, regression.percent_change));
            output.push_str(&format!(
                "    Baseline: {:.2}ms (median: {:.2}ms, stddev: {:.2}ms)\n",
                regression.baseline_time, regression.baseline_time_median, regression.baseline_time_std_dev
            ));
            output.push_str(&format!(
                "    Current:  {:.2}ms (median: {:.2}ms, stddev: {:.2}ms)\n",
                regression.current_time, regression.current_time_median, regression.current_time_std_dev
            ));
        }
    }

    output.push_str(&format!("\nDistribution Details (Top {} Slowest Rules):\n", SLOWEST_SHOWN));
    output.push_str(&format!("{}\n", rule_line));
    for rule in results.slowest(SLOWEST_SHOWN) {
        output.push_str(&format!("\n{}:\n", rule.name));
        output.push_str(&format!("  Mean: {:.2}ms\n", rule.execution_time));
        output.push_str(&format!("  Median: {:.2}ms\n", rule.execution_time_median));
        output.push_str(&format!("  StdDev: {:.2}ms\n", rule.execution_time_std_dev));
        output.push_str(&format!(
            "  Range: {:.2}ms - {:.2}ms\n",
            rule.execution_time_min, rule.execution_time_max
        ));
        output.push_str(&format!(
            "  P25: {:.2}ms, P75: {:.2}ms, P95: {:.2}ms\n",
            rule.execution_time_p25, rule.execution_time_p75, rule.execution_time_p95
        ));
        if rule.outliers_removed > 0 {
            output.push_str(&format!("  Outliers removed: {}\n", rule.outliers_removed));
        }
    }

    output
}

/// @ai:intent Message for the outcome of a standalone regression check
/// @ai:effects pure
pub fn format_regression_check(check: &RegressionCheck) -> String {
    match check {
        RegressionCheck::NoBaseline => "No baseline found. Run benchmark with --baseline first.\n".to_string(),
        RegressionCheck::Passed => "No performance regressions detected\n".to_string(),
        RegressionCheck::Regressions(regressions) => {
            let mut output = String::from("Performance Regressions Detected:\n\n");
            for regression in regressions {
                output.push_str(&format!("  - {}: {}% slower\n", regression.rule, regression.percent_change));
                output.push_str(&format!(
                    "    Baseline: {}ms, Current: {}ms\n\n",
                    regression.baseline_time, regression.current_time
                ));
            }
            output
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{Regression, RuleBenchmark, Statistics};

    fn results() -> BenchmarkResults {
        let mut slow = RuleBenchmark::from_statistics("SlowRule", "naming", &Statistics::default(), 4);
        slow.execution_time = 12.0;
        slow.regression = true;
        slow.outliers_removed = 2;
        let fast = RuleBenchmark::from_statistics("FastRule", "naming", &Statistics::default(), 0);

        BenchmarkResults {
            rules: vec![fast, slow],
            total_time: 30.0,
            baseline_time: 25.0,
            iterations: 10,
            regressions: vec![Regression {
                rule: "SlowRule".into(),
                baseline_time: 10.0,
                baseline_time_median: 10.0,
                baseline_time_std_dev: 0.5,
                current_time: 12.0,
                current_time_median: 12.0,
                current_time_std_dev: 0.4,
                percent_change: 20.0,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_results_table() {
        let text = format_results(&results());
        assert!(text.contains("Total Time: 30.00ms"));
        assert!(text.contains("Baseline Time: 25.00ms"));
        assert!(text.contains("Outliers removed: 2 total across all rules"));
        assert!(text.contains("  - SlowRule: 20% slower"));
        assert!(text.contains("    Baseline: 10.00ms (median: 10.00ms, stddev: 0.50ms)"));

        // slowest first in the distribution section
        let details = text.split("Distribution Details").nth(1).unwrap();
        assert!(details.find("SlowRule:").unwrap() < details.find("FastRule:").unwrap());
    }

    #[test]
    fn test_regression_check_messages() {
        assert!(format_regression_check(&RegressionCheck::Passed).contains("No performance regressions"));
        assert!(format_regression_check(&RegressionCheck::NoBaseline).contains("--baseline"));

        let regression = results().regressions.remove(0);
        let text = format_regression_check(&RegressionCheck::Regressions(vec![regression]));
        assert!(text.contains("Baseline: 10ms, Current: 12ms"));
    }
}
