//! @ai:module:intent Time every rule over the benchmark fixtures
//! @ai:module:layer application
//! @ai:module:public_api BenchmarkExecutor, minimum_iteration_time
//! @ai:module:stateless false

use crate::config::RunConfig;
use crate::metrics::stats::round2;
use crate::metrics::{calculate_statistics, BenchmarkResults, RuleBenchmark};
use crate::runner::engine::RuleEngineTrait;
use crate::runner::fixtures::{total_kilobytes, Fixture};
use crate::runner::simulate::simulate_violations;
use apex_rules::{RuleFile, Violation};
use std::sync::Arc;
use std::time::Instant;

/// @ai:intent Lower bound for one iteration: base cost plus violations and input size
/// @ai:effects pure
pub fn minimum_iteration_time(violations: usize, total_kb: f64) -> f64 {
    5.0 + violations as f64 * 0.1 + total_kb * 0.05
}

/// @ai:intent Runs rules through an engine, simulating when it is absent or fails
pub struct BenchmarkExecutor<E: RuleEngineTrait> {
    engine: Option<Arc<E>>,
    run_config: RunConfig,
}

impl<E: RuleEngineTrait> BenchmarkExecutor<E> {
    /// @ai:intent Create an executor; `None` simulates every rule
    /// @ai:effects pure
    pub fn new(engine: Option<Arc<E>>, run_config: RunConfig) -> Self {
        Self { engine, run_config }
    }

    /// @ai:intent Violations of one rule over all fixtures
    /// @ai:effects io
    async fn collect_violations(&self, rule: &RuleFile, fixtures: &[Fixture]) -> Vec<Violation> {
        let mut violations = Vec::new();

        for fixture in fixtures {
            let file = fixture.path.display().to_string();
            let Some(engine) = &self.engine else {
                violations.extend(simulate_violations(&rule.name, &file, &fixture.content));
                continue;
            };

            match engine.violations(&rule.path, &fixture.path).await {
                Ok(found) => violations.extend(found),
                Err(e) => {
                    tracing::warn!("Could not run PMD for {} on {}: {}", rule.name, file, e);
                    violations.extend(simulate_violations(&rule.name, &file, &fixture.content));
                }
            }
        }

        violations
    }

    /// @ai:intent Time one rule for the configured number of iterations
    /// @ai:effects io
    pub async fn benchmark_rule(&self, rule: &RuleFile, fixtures: &[Fixture]) -> RuleBenchmark {
        let total_kb = total_kilobytes(fixtures);
        let mut times = Vec::with_capacity(self.run_config.iterations as usize);
        let mut reported = 0;

        for iteration in 0..self.run_config.iterations {
            let start = Instant::now();
            let violations = self.collect_violations(rule, fixtures).await;
            let measured = start.elapsed().as_secs_f64() * 1000.0;

            times.push(measured.max(minimum_iteration_time(violations.len(), total_kb)));
            if iteration == 0 {
                reported = violations.len();
            }
        }

        let stats = calculate_statistics(&times);
        RuleBenchmark::from_statistics(&rule.name, &rule.category, &stats, reported)
    }

    /// @ai:intent Benchmark every rule, returning results without baseline data
    /// @ai:effects io
    pub async fn execute_all(&self, rules: &[RuleFile], fixtures: &[Fixture]) -> BenchmarkResults {
        let timestamp = chrono::Utc::now().to_rfc3339();
        let start = Instant::now();
        let mut results = Vec::with_capacity(rules.len());

        for (index, rule) in rules.iter().enumerate() {
            let benchmark = self.benchmark_rule(rule, fixtures).await;
            tracing::info!(
                "[{}/{}] {} ({} valid iterations)",
                index + 1,
                rules.len(),
                rule.name,
                benchmark.iterations
            );
            results.push(benchmark);
        }

        BenchmarkResults {
            timestamp,
            rules: results,
            total_time: round2(start.elapsed().as_secs_f64() * 1000.0),
            baseline_time: 0.0,
            regressions: Vec::new(),
            iterations: self.run_config.iterations,
        }
    }
}
