//! @ai:module:intent JSON result files
//! @ai:module:layer infrastructure
//! @ai:module:public_api JsonReporter, JsonReporterTrait
//! @ai:module:stateless true

use crate::metrics::BenchmarkResults;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// @ai:intent Trait for JSON report generation
pub trait JsonReporterTrait: Send + Sync {
    /// @ai:intent Generate JSON report from results
    fn generate(&self, results: &BenchmarkResults, output_path: &Path) -> Result<()>;
}

/// @ai:intent Generates JSON reports from benchmark results
pub struct JsonReporter;

impl JsonReporter {
    /// @ai:intent Create a new JSON reporter
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Save a run as `results-<unix millis>.json`, optionally as the baseline too
    /// @ai:effects fs:write
    pub fn save_run(&self, results: &BenchmarkResults, results_dir: &Path, as_baseline: bool) -> Result<PathBuf> {
        std::fs::create_dir_all(results_dir)
            .with_context(|| format!("Failed to create {}", results_dir.display()))?;

        let path = results_dir.join(format!("results-{}.json", chrono::Utc::now().timestamp_millis()));
        self.generate(results, &path)?;

        if as_baseline {
            self.generate(results, &results_dir.join("baseline.json"))?;
            tracing::info!("Baseline saved");
        }

        Ok(path)
    }

    /// @ai:intent Read a results file written by a previous run
    /// @ai:effects fs:read
    pub fn load(&self, path: &Path) -> Result<BenchmarkResults> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonReporterTrait for JsonReporter {
    /// @ai:intent Generate JSON report to file
    /// @ai:effects fs:write
    fn generate(&self, results: &BenchmarkResults, output_path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(output_path, json)?;
        Ok(())
    }
}
