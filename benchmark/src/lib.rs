//! @ai:module:intent Apex rule benchmark library
//! @ai:module:layer application
//! @ai:module:public_api config, metrics, report, runner, toolchain

pub mod config;
pub mod metrics;
pub mod report;
pub mod runner;
pub mod toolchain;

pub use config::BenchmarkConfig;
pub use metrics::{BenchmarkResults, RegressionCheck, RuleBenchmark, Statistics};
pub use report::ReportGenerator;
pub use runner::{BenchmarkExecutor, MockRuleEngine, PmdEngine, RuleEngineTrait};
pub use toolchain::{ToolchainStatus, ToolchainValidator};
