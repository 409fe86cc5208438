//! @ai:module:intent Compare benchmark results against a stored baseline
//! @ai:module:layer application
//! @ai:module:public_api compare_with_baseline, load_baseline, check_performance_regressions, RegressionCheck, RegressionCheckError
//! @ai:module:depends_on metrics::types

use crate::metrics::stats::round2;
use crate::metrics::types::{BaselineResults, BaselineRule, BenchmarkResults, Regression, RuleBenchmark};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// @ai:intent Failures of the standalone regression check
#[derive(Debug, Error)]
pub enum RegressionCheckError {
    #[error("Invalid results path (outside project root): {0}")]
    OutsideRoot(PathBuf),

    #[error("Results file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// @ai:intent Outcome of the standalone regression check
#[derive(Debug, Clone, PartialEq)]
pub enum RegressionCheck {
    NoBaseline,
    Passed,
    Regressions(Vec<Regression>),
}

/// Percent change from baseline, `None` when the baseline has no usable time
fn percent_change(baseline: f64, current: f64) -> Option<f64> {
    (baseline > 0.0).then(|| (current - baseline) / baseline * 100.0)
}

fn regression_of(rule: &RuleBenchmark, baseline: &BaselineRule, threshold: f64) -> Option<Regression> {
    let baseline_time = baseline.time();
    let change = percent_change(baseline_time, rule.execution_time)?;
    if change <= threshold {
        return None;
    }

    Some(Regression {
        rule: rule.name.clone(),
        baseline_time,
        baseline_time_median: baseline
            .execution_time_median
            .filter(|m| *m != 0.0)
            .unwrap_or(baseline_time),
        baseline_time_std_dev: baseline.execution_time_std_dev.unwrap_or(0.0),
        current_time: rule.execution_time,
        current_time_median: rule.execution_time_median,
        current_time_std_dev: rule.execution_time_std_dev,
        percent_change: round2(change),
    })
}

/// @ai:intent Flag rules slower than the baseline by more than the threshold percent
/// @ai:effects mutation
pub fn compare_with_baseline(results: &mut BenchmarkResults, baseline: Option<&BaselineResults>, threshold: f64) {
    let Some(baseline) = baseline else {
        results.baseline_time = results.total_time;
        return;
    };

    results.baseline_time = baseline.total_time;
    results.regressions.clear();

    for rule in &mut results.rules {
        let Some(regression) = baseline.rule(&rule.name).and_then(|b| regression_of(rule, b, threshold)) else {
            continue;
        };
        rule.regression = true;
        results.regressions.push(regression);
    }
}

/// @ai:intent Read the baseline file if one exists
/// @ai:effects fs:read
pub fn load_baseline(path: &Path) -> Result<Option<BaselineResults>, RegressionCheckError> {
    if !path.is_file() {
        return Ok(None);
    }
    read_json(path).map(Some)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, RegressionCheckError> {
    let content = std::fs::read_to_string(path).map_err(|source| RegressionCheckError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| RegressionCheckError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve `.` and `..` without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// @ai:intent Resolve a results path against the root, rejecting paths that escape it
/// @ai:pre root is absolute
/// @ai:effects pure
pub fn resolve_within_root(root: &Path, results_path: &Path) -> Result<PathBuf, RegressionCheckError> {
    let root = normalize(root);
    let resolved = normalize(&root.join(results_path));

    if resolved == root || !resolved.starts_with(&root) {
        return Err(RegressionCheckError::OutsideRoot(results_path.to_path_buf()));
    }
    Ok(resolved)
}

/// @ai:intent Compare a saved results file with the baseline
/// @ai:pre root is absolute
/// @ai:effects fs:read
pub fn check_performance_regressions(
    root: &Path,
    results_path: &Path,
    baseline_path: &Path,
    threshold: f64,
) -> Result<RegressionCheck, RegressionCheckError> {
    let resolved = resolve_within_root(root, results_path)?;
    if !resolved.is_file() {
        return Err(RegressionCheckError::NotFound(results_path.to_path_buf()));
    }

    let results: BenchmarkResults = read_json(&resolved)?;
    let Some(baseline) = load_baseline(baseline_path)? else {
        return Ok(RegressionCheck::NoBaseline);
    };

    let regressions: Vec<Regression> = results
        .rules
        .iter()
        .filter_map(|rule| baseline.rule(&rule.name).and_then(|b| regression_of(rule, b, threshold)))
        .collect();

    if regressions.is_empty() {
        Ok(RegressionCheck::Passed)
    } else {
        Ok(RegressionCheck::Regressions(regressions))
    }
}
