//! @ai:module:intent Rule execution and timing for benchmarks
//! @ai:module:layer infrastructure
//! @ai:module:public_api BenchmarkExecutor, RuleEngineTrait, PmdEngine, MockRuleEngine, Fixture, discover_fixtures

pub mod engine;
pub mod executor;
pub mod fixtures;
pub mod simulate;

pub use engine::{MockRuleEngine, PmdEngine, RuleEngineTrait};
pub use executor::{minimum_iteration_time, BenchmarkExecutor};
pub use fixtures::{discover_fixtures, total_kilobytes, Fixture};
pub use simulate::{estimate_violations, simulate_violations};
