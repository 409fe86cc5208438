//! @ai:module:intent Project configuration loaded from apex-rules.toml
//! @ai:module:layer infrastructure
//! @ai:module:public_api ProjectConfig, PathConfig, TestConfig, PmdConfig, CONFIG_FILE
//! @ai:module:stateless true

use crate::error::{read_to_string, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the project root
pub const CONFIG_FILE: &str = "apex-rules.toml";

/// @ai:intent Main configuration for a rule repository
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectConfig {
    #[serde(default)]
    pub paths: PathConfig,
    #[serde(default)]
    pub tests: TestConfig,
    #[serde(default)]
    pub pmd: PmdConfig,
}

/// @ai:intent Locations of project artifacts, relative to the project root
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathConfig {
    #[serde(default = "default_rulesets_dir")]
    pub rulesets_dir: PathBuf,
    #[serde(default = "default_tests_dir")]
    pub tests_dir: PathBuf,
    #[serde(default = "default_fixtures_dir")]
    pub fixtures_dir: PathBuf,
    #[serde(default = "default_code_analyzer")]
    pub code_analyzer: PathBuf,
    #[serde(default = "default_coverage_dir")]
    pub coverage_dir: PathBuf,
    #[serde(default = "default_test_ruleset")]
    pub test_ruleset: PathBuf,
    #[serde(default = "default_package_manifest")]
    pub package_manifest: PathBuf,
    #[serde(default = "default_changelog")]
    pub changelog: PathBuf,
}

/// @ai:intent How rule test suites are located and run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestConfig {
    #[serde(default = "default_test_suffix")]
    pub suffix: String,
    #[serde(default = "default_test_command")]
    pub command: String,
}

/// @ai:intent PMD CLI settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PmdConfig {
    #[serde(default = "default_pmd_binary")]
    pub binary: String,
    #[serde(default = "default_pmd_timeout")]
    pub timeout_secs: u64,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            rulesets_dir: default_rulesets_dir(),
            tests_dir: default_tests_dir(),
            fixtures_dir: default_fixtures_dir(),
            code_analyzer: default_code_analyzer(),
            coverage_dir: default_coverage_dir(),
            test_ruleset: default_test_ruleset(),
            package_manifest: default_package_manifest(),
            changelog: default_changelog(),
        }
    }
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            suffix: default_test_suffix(),
            command: default_test_command(),
        }
    }
}

impl Default for PmdConfig {
    fn default() -> Self {
        Self {
            binary: default_pmd_binary(),
            timeout_secs: default_pmd_timeout(),
        }
    }
}

fn default_rulesets_dir() -> PathBuf {
    PathBuf::from("rulesets")
}

fn default_tests_dir() -> PathBuf {
    PathBuf::from("tests/unit")
}

fn default_fixtures_dir() -> PathBuf {
    PathBuf::from("tests/fixtures")
}

fn default_code_analyzer() -> PathBuf {
    PathBuf::from("code-analyzer.yml")
}

fn default_coverage_dir() -> PathBuf {
    PathBuf::from("coverage")
}

fn default_test_ruleset() -> PathBuf {
    PathBuf::from("tests/rulesets/test-ruleset.xml")
}

fn default_package_manifest() -> PathBuf {
    PathBuf::from("package.json")
}

fn default_changelog() -> PathBuf {
    PathBuf::from("CHANGELOG.md")
}

fn default_test_suffix() -> String {
    ".test.js".to_string()
}

fn default_test_command() -> String {
    "pnpm test --json".to_string()
}

fn default_pmd_binary() -> String {
    "pmd".to_string()
}

fn default_pmd_timeout() -> u64 {
    30
}

impl ProjectConfig {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// @ai:intent Load apex-rules.toml from the root, or defaults when absent
    /// @ai:effects fs:read
    pub fn load_or_default(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ProjectConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(config, ProjectConfig::default());
        assert_eq!(config.tests.suffix, ".test.js");
        assert_eq!(config.pmd.timeout_secs, 30);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[pmd]\nbinary = \"/opt/pmd/bin/pmd\"\n",
        )
        .unwrap();

        let config = ProjectConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(config.pmd.binary, "/opt/pmd/bin/pmd");
        assert_eq!(config.pmd.timeout_secs, 30);
        assert_eq!(config.paths.rulesets_dir, PathBuf::from("rulesets"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut config = ProjectConfig::default();
        config.tests.command = "npm test -- --json".to_string();

        config.save(&path).unwrap();
        assert_eq!(ProjectConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[pmd\n").unwrap();
        assert!(ProjectConfig::load_or_default(dir.path()).is_err());
    }
}
