//! @ai:module:intent Report generation for benchmark results
//! @ai:module:layer infrastructure
//! @ai:module:public_api ReportGenerator, JsonReporter, MarkdownReporter, ChartGenerator, format_results

pub mod charts;
pub mod json_report;
pub mod markdown_report;
pub mod text_report;

pub use charts::{ChartGenerator, ChartGeneratorTrait};
pub use json_report::{JsonReporter, JsonReporterTrait};
pub use markdown_report::{MarkdownReporter, MarkdownReporterTrait};
pub use text_report::{format_regression_check, format_results};

use crate::metrics::BenchmarkResults;
use anyhow::Result;
use std::path::Path;

/// @ai:intent Combined report generator
pub struct ReportGenerator {
    json: JsonReporter,
    markdown: MarkdownReporter,
    charts: ChartGenerator,
}

impl ReportGenerator {
    /// @ai:intent Create a new report generator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self {
            json: JsonReporter::new(),
            markdown: MarkdownReporter::new(),
            charts: ChartGenerator::new(),
        }
    }

    /// @ai:intent Generate JSON, Markdown and chart reports into one directory
    /// @ai:effects fs:write
    pub fn generate_all(&self, results: &BenchmarkResults, output_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(output_dir)?;

        self.json.generate(results, &output_dir.join("results.json"))?;
        self.markdown
            .generate(results, &output_dir.join("results.md"))?;
        let charts = self.charts.generate_all(results, output_dir)?;

        tracing::info!(
            "Reports generated in {} ({} charts)",
            output_dir.display(),
            charts.len()
        );
        Ok(())
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generate_all_without_rules() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("reports");

        ReportGenerator::new()
            .generate_all(&BenchmarkResults::default(), &dir)
            .unwrap();

        assert!(dir.join("results.json").exists());
        assert!(dir.join("results.md").exists());
        assert!(!dir.join("slowest_rules.png").exists());
    }
}
