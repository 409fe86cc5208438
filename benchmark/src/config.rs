//! @ai:module:intent Configuration structs for the benchmark harness
//! @ai:module:layer infrastructure
//! @ai:module:public_api BenchmarkConfig, RunConfig, PathConfig, PmdSettings, CONFIG_FILE
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the repository root
pub const CONFIG_FILE: &str = "benchmark.toml";

/// @ai:intent Main configuration for the benchmark harness
/// @ai:effects pure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub paths: PathConfig,
    #[serde(default)]
    pub pmd: PmdSettings,
}

/// @ai:intent How each rule is measured
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Percent slowdown over the baseline counted as a regression
    #[serde(default = "default_threshold")]
    pub regression_threshold: f64,
}

/// @ai:intent Input and output locations, relative to the repository root
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    #[serde(default = "default_fixtures_dir")]
    pub fixtures_dir: PathBuf,
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
}

/// @ai:intent PMD invocation settings
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PmdSettings {
    #[serde(default = "default_pmd_binary")]
    pub binary: String,
    #[serde(default = "default_pmd_timeout")]
    pub timeout_secs: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            regression_threshold: default_threshold(),
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            fixtures_dir: default_fixtures_dir(),
            results_dir: default_results_dir(),
        }
    }
}

impl Default for PmdSettings {
    fn default() -> Self {
        Self {
            binary: default_pmd_binary(),
            timeout_secs: default_pmd_timeout(),
        }
    }
}

fn default_iterations() -> u32 {
    10
}

fn default_threshold() -> f64 {
    10.0
}

fn default_fixtures_dir() -> PathBuf {
    PathBuf::from("benchmarks/fixtures")
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("benchmarks/results")
}

fn default_pmd_binary() -> String {
    "pmd".to_string()
}

fn default_pmd_timeout() -> u64 {
    30
}

impl BenchmarkConfig {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// @ai:intent Load an explicit config, else benchmark.toml in the root, else defaults
    /// @ai:effects fs:read
    pub fn load_or_default(root: &Path, explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let path = root.join(CONFIG_FILE);
                if path.is_file() {
                    Self::load(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn results_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.paths.results_dir)
    }

    pub fn baseline_path(&self, root: &Path) -> PathBuf {
        self.results_dir(root).join("baseline.json")
    }

    pub fn fixtures_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.paths.fixtures_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: BenchmarkConfig = toml::from_str("[run]\niterations = 3\n").unwrap();
        assert_eq!(config.run.iterations, 3);
        assert_eq!(config.run.regression_threshold, 10.0);
        assert_eq!(config.paths.fixtures_dir, PathBuf::from("benchmarks/fixtures"));
        assert_eq!(config.pmd.timeout_secs, 30);
    }

    #[test]
    fn test_save_and_load_from_root() {
        let temp = TempDir::new().unwrap();
        let mut config = BenchmarkConfig::default();
        config.run.iterations = 4;
        config.save(&temp.path().join(CONFIG_FILE)).unwrap();

        let loaded = BenchmarkConfig::load_or_default(temp.path(), None).unwrap();
        assert_eq!(loaded.run.iterations, 4);
        assert_eq!(
            loaded.baseline_path(temp.path()),
            temp.path().join("benchmarks/results/baseline.json")
        );
    }

    #[test]
    fn test_missing_file_is_default() {
        let temp = TempDir::new().unwrap();
        let loaded = BenchmarkConfig::load_or_default(temp.path(), None).unwrap();
        assert_eq!(loaded.run.iterations, 10);
    }
}
