//! @ai:module:intent Timing statistics, result types and baseline comparison
//! @ai:module:layer application
//! @ai:module:public_api Statistics, RuleBenchmark, BenchmarkResults, Regression, compare_with_baseline, check_performance_regressions

pub mod regression;
pub mod stats;
pub mod types;

pub use regression::{
    check_performance_regressions, compare_with_baseline, load_baseline, resolve_within_root,
    RegressionCheck, RegressionCheckError,
};
pub use stats::{calculate_statistics, Statistics};
pub use types::{BaselineResults, BaselineRule, BenchmarkResults, Regression, RuleBenchmark};
