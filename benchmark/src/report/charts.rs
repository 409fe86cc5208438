//! @ai:module:intent Chart generation for benchmark results
//! @ai:module:layer infrastructure
//! @ai:module:public_api ChartGenerator
//! @ai:module:stateless true

use crate::metrics::BenchmarkResults;
use anyhow::Result;
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;

const SLOWEST_CHARTED: usize = 10;

/// @ai:intent Trait for chart generation
pub trait ChartGeneratorTrait: Send + Sync {
    /// @ai:intent Generate all charts from results
    fn generate_all(&self, results: &BenchmarkResults, output_dir: &Path) -> Result<Vec<String>>;
}

/// @ai:intent Generates charts from benchmark results
pub struct ChartGenerator;

impl ChartGenerator {
    /// @ai:intent Create a new chart generator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Average mean execution time per category, sorted by category
    /// @ai:effects pure
    fn category_means(results: &BenchmarkResults) -> Vec<(String, f64)> {
        let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for rule in &results.rules {
            let entry = sums.entry(rule.category.as_str()).or_insert((0.0, 0));
            entry.0 += rule.execution_time;
            entry.1 += 1;
        }

        sums.into_iter()
            .map(|(category, (sum, count))| (category.to_string(), sum / count as f64))
            .collect()
    }

    /// @ai:intent Draw one labelled bar per entry
    /// @ai:effects fs:write
    fn draw_bars(&self, caption: &str, data: &[(String, f64)], output_path: &Path) -> Result<()> {
        let root = BitMapBackend::new(output_path, (1000, 600)).into_drawing_area();
        root.fill(&WHITE)?;

        let y_max = data.iter().map(|(_, v)| *v).fold(0.0, f64::max).max(1.0) * 1.1;

        let mut chart = ChartBuilder::on(&root)
            .caption(caption, ("sans-serif", 25))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(60)
            .build_cartesian_2d(0..data.len() as i32, 0f64..y_max)?;

        chart
            .configure_mesh()
            .x_labels(data.len())
            .y_desc("Mean execution time (ms)")
            .x_label_formatter(&|x| {
                data.get(*x as usize)
                    .map(|(name, _)| name.clone())
                    .unwrap_or_default()
            })
            .draw()?;

        chart.draw_series(data.iter().enumerate().map(|(i, (_, value))| {
            Rectangle::new(
                [(i as i32, 0.0), (i as i32 + 1, *value)],
                BLUE.mix(0.7).filled(),
            )
        }))?;

        root.present()?;
        Ok(())
    }
}

impl Default for ChartGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartGeneratorTrait for ChartGenerator {
    /// @ai:intent Generate the slowest-rules and per-category charts
    /// @ai:effects fs:write
    fn generate_all(&self, results: &BenchmarkResults, output_dir: &Path) -> Result<Vec<String>> {
        if results.rules.is_empty() {
            return Ok(Vec::new());
        }

        std::fs::create_dir_all(output_dir)?;
        let mut generated = Vec::new();

        let slowest: Vec<(String, f64)> = results
            .slowest(SLOWEST_CHARTED)
            .into_iter()
            .map(|r| (r.name.clone(), r.execution_time))
            .collect();
        self.draw_bars("Slowest Rules", &slowest, &output_dir.join("slowest_rules.png"))?;
        generated.push("slowest_rules.png".to_string());

        let categories = Self::category_means(results);
        self.draw_bars("Mean Time by Category", &categories, &output_dir.join("by_category.png"))?;
        generated.push("by_category.png".to_string());

        Ok(generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{RuleBenchmark, Statistics};
    use tempfile::TempDir;

    fn rule(name: &str, category: &str, time: f64) -> RuleBenchmark {
        let mut rule = RuleBenchmark::from_statistics(name, category, &Statistics::default(), 0);
        rule.execution_time = time;
        rule
    }

    fn create_test_results() -> BenchmarkResults {
        BenchmarkResults {
            rules: vec![
                rule("NoAbbreviations", "naming", 8.0),
                rule("PascalCaseClasses", "naming", 4.0),
                rule("NoMethodChaining", "design", 12.0),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_category_means() {
        let means = ChartGenerator::category_means(&create_test_results());
        assert_eq!(
            means,
            vec![("design".to_string(), 12.0), ("naming".to_string(), 6.0)]
        );
    }

    #[test]
    fn test_no_rules_no_charts() {
        let temp = TempDir::new().unwrap();
        let files = ChartGenerator::new()
            .generate_all(&BenchmarkResults::default(), temp.path())
            .unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_generate_all_charts() {
        let generator = ChartGenerator::new();
        let temp = TempDir::new().unwrap();
        let results = create_test_results();

        let files = generator.generate_all(&results, temp.path()).unwrap();

        assert_eq!(files.len(), 2);
        assert!(temp.path().join("slowest_rules.png").exists());
        assert!(temp.path().join("by_category.png").exists());
    }
}
