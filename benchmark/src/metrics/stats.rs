//! @ai:module:intent Timing statistics with IQR outlier removal
//! @ai:module:layer domain
//! @ai:module:public_api Statistics, calculate_statistics
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};

/// @ai:intent Summary of one rule's execution times, in milliseconds
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
    pub p25: f64,
    pub p75: f64,
    pub p95: f64,
    pub outliers_removed: usize,
    pub iterations: usize,
}

/// Quartiles taken from the unfiltered, sorted samples
#[derive(Debug, Clone, Copy)]
struct Quartiles {
    q1: f64,
    median: f64,
    q3: f64,
    p95: f64,
}

impl Quartiles {
    fn of(sorted: &[f64]) -> Self {
        Self {
            q1: at(sorted, 0.25),
            median: at(sorted, 0.5),
            q3: at(sorted, 0.75),
            p95: at(sorted, 0.95),
        }
    }
}

/// Value at `floor(len * fraction)` of a sorted, non-empty slice
fn at(sorted: &[f64], fraction: f64) -> f64 {
    let index = ((sorted.len() as f64) * fraction).floor() as usize;
    sorted[index.min(sorted.len() - 1)]
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// @ai:intent Statistics after dropping values outside 1.5 IQR of the quartiles
/// @ai:effects pure
pub fn calculate_statistics(times: &[f64]) -> Statistics {
    if times.is_empty() {
        return Statistics::default();
    }

    let mut sorted = times.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let quartiles = Quartiles::of(&sorted);
    let iqr = quartiles.q3 - quartiles.q1;
    let lower = quartiles.q1 - 1.5 * iqr;
    let upper = quartiles.q3 + 1.5 * iqr;

    let kept: Vec<f64> = sorted
        .iter()
        .copied()
        .filter(|t| *t >= lower && *t <= upper)
        .collect();

    if kept.is_empty() {
        return summarize(&sorted, 0, None);
    }

    summarize(&kept, sorted.len() - kept.len(), Some(quartiles))
}

/// @ai:intent Mean, population deviation and percentiles of sorted values
/// @ai:effects pure
fn summarize(values: &[f64], outliers_removed: usize, quartiles: Option<Quartiles>) -> Statistics {
    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;
    let quartiles = quartiles.unwrap_or_else(|| Quartiles::of(values));

    Statistics {
        mean: round2(mean),
        median: quartiles.median,
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        std_dev: round2(variance.sqrt()),
        p25: round2(quartiles.q1),
        p75: round2(quartiles.q3),
        p95: round2(quartiles.p95),
        outliers_removed,
        iterations: values.len(),
    }
}
