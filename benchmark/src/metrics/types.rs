//! @ai:module:intent Result types written to and read from benchmark JSON files
//! @ai:module:layer domain
//! @ai:module:public_api RuleBenchmark, BenchmarkResults, Regression, BaselineResults, BaselineRule
//! @ai:module:stateless true

use crate::metrics::stats::Statistics;
use serde::{Deserialize, Serialize};

/// @ai:intent Measured performance of one rule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuleBenchmark {
    pub name: String,
    pub category: String,
    /// Mean after outlier removal, the value compared against the baseline
    pub execution_time: f64,
    pub execution_time_median: f64,
    pub execution_time_min: f64,
    pub execution_time_max: f64,
    pub execution_time_std_dev: f64,
    pub execution_time_p25: f64,
    pub execution_time_p75: f64,
    pub execution_time_p95: f64,
    pub outliers_removed: usize,
    pub iterations: usize,
    pub violations: usize,
    pub regression: bool,
}

impl RuleBenchmark {
    /// @ai:intent Build a rule result from its timing statistics
    /// @ai:effects pure
    pub fn from_statistics(name: &str, category: &str, stats: &Statistics, violations: usize) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            execution_time: stats.mean,
            execution_time_median: stats.median,
            execution_time_min: stats.min,
            execution_time_max: stats.max,
            execution_time_std_dev: stats.std_dev,
            execution_time_p25: stats.p25,
            execution_time_p75: stats.p75,
            execution_time_p95: stats.p95,
            outliers_removed: stats.outliers_removed,
            iterations: stats.iterations,
            violations,
            regression: false,
        }
    }
}

/// @ai:intent A rule that became slower than its baseline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Regression {
    pub rule: String,
    pub baseline_time: f64,
    pub baseline_time_median: f64,
    pub baseline_time_std_dev: f64,
    pub current_time: f64,
    pub current_time_median: f64,
    pub current_time_std_dev: f64,
    pub percent_change: f64,
}

/// @ai:intent Complete output of one benchmark run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkResults {
    /// RFC 3339 start time
    pub timestamp: String,
    pub rules: Vec<RuleBenchmark>,
    pub total_time: f64,
    pub baseline_time: f64,
    pub regressions: Vec<Regression>,
    pub iterations: u32,
}

impl BenchmarkResults {
    /// @ai:intent Rules ordered slowest first, at most `limit`
    /// @ai:effects pure
    pub fn slowest(&self, limit: usize) -> Vec<&RuleBenchmark> {
        let mut rules: Vec<&RuleBenchmark> = self.rules.iter().collect();
        rules.sort_by(|a, b| b.execution_time.total_cmp(&a.execution_time));
        rules.truncate(limit);
        rules
    }

    pub fn total_outliers(&self) -> usize {
        self.rules.iter().map(|r| r.outliers_removed).sum()
    }
}

/// @ai:intent Baseline rule entry, tolerant of older result files
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BaselineRule {
    pub name: String,
    #[serde(default)]
    pub execution_time: Option<f64>,
    /// Field name used by older result files
    #[serde(default)]
    pub execution_time_mean: Option<f64>,
    #[serde(default)]
    pub execution_time_median: Option<f64>,
    #[serde(default)]
    pub execution_time_std_dev: Option<f64>,
}

impl BaselineRule {
    /// @ai:intent Comparable time: executionTime, else executionTimeMean, else zero
    /// @ai:effects pure
    pub fn time(&self) -> f64 {
        [self.execution_time, self.execution_time_mean]
            .into_iter()
            .flatten()
            .find(|t| *t != 0.0)
            .unwrap_or(0.0)
    }
}

/// @ai:intent Baseline file contents needed for comparison
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BaselineResults {
    #[serde(default)]
    pub total_time: f64,
    #[serde(default)]
    pub rules: Vec<BaselineRule>,
}

impl BaselineResults {
    pub fn rule(&self, name: &str) -> Option<&BaselineRule> {
        self.rules.iter().find(|r| r.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rule_serializes_camel_case() {
        let rule = RuleBenchmark::from_statistics("NoAbbreviations", "naming", &Statistics::default(), 2);
        let json = serde_json::to_value(&rule).unwrap();
        assert!(json.get("executionTimeStdDev").is_some());
        assert!(json.get("outliersRemoved").is_some());
        assert_eq!(json["violations"], 2);
    }

    #[test]
    fn test_baseline_rule_legacy_mean() {
        let baseline: BaselineResults = serde_json::from_str(
            r#"{"totalTime": 120.5, "rules": [
                {"name": "A", "executionTime": 4.0},
                {"name": "B", "executionTimeMean": 6.5},
                {"name": "C", "executionTime": 0, "executionTimeMean": 3.0},
                {"name": "D"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(baseline.total_time, 120.5);
        assert_eq!(baseline.rule("A").unwrap().time(), 4.0);
        assert_eq!(baseline.rule("B").unwrap().time(), 6.5);
        assert_eq!(baseline.rule("C").unwrap().time(), 3.0);
        assert_eq!(baseline.rule("D").unwrap().time(), 0.0);
        assert!(baseline.rule("E").is_none());
    }

    #[test]
    fn test_slowest_orders_descending() {
        let mut results = BenchmarkResults::default();
        for (name, time) in [("A", 1.0), ("B", 3.0), ("C", 2.0)] {
            let mut rule = RuleBenchmark::from_statistics(name, "x", &Statistics::default(), 0);
            rule.execution_time = time;
            results.rules.push(rule);
        }
        let names: Vec<&str> = results.slowest(2).iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C"]);
    }
}
