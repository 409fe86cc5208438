//! @ai:module:intent Locate rules, tests and fixtures inside a rule repository
//! @ai:module:layer infrastructure
//! @ai:module:public_api Project, RuleFile, RuleKind, FixtureKind
//! @ai:module:depends_on config, regex_rules, error

use crate::config::ProjectConfig;
use crate::error::Result;
use crate::regex_rules::CodeAnalyzerConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

/// @ai:intent How a rule is defined
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Xml,
    Regex,
}

/// @ai:intent Which side of a rule a fixture exercises
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FixtureKind {
    /// Code that must not trigger the rule
    Positive,
    /// Code that must trigger the rule at least once
    Negative,
}

impl fmt::Display for FixtureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixtureKind::Positive => write!(f, "positive"),
            FixtureKind::Negative => write!(f, "negative"),
        }
    }
}

/// @ai:intent A discovered rule and where it is defined
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleFile {
    pub kind: RuleKind,
    pub category: String,
    pub file: String,
    pub name: String,
    pub path: PathBuf,
}

/// @ai:intent A rule repository rooted at a directory
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub config: ProjectConfig,
}

impl Project {
    /// @ai:intent Create a project with explicit configuration
    /// @ai:effects pure
    pub fn new(root: impl Into<PathBuf>, config: ProjectConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// @ai:intent Open a project, reading apex-rules.toml when present
    /// @ai:effects fs:read
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let config = ProjectConfig::load_or_default(&root)?;
        Ok(Self { root, config })
    }

    pub fn rulesets_dir(&self) -> PathBuf {
        self.root.join(&self.config.paths.rulesets_dir)
    }

    pub fn tests_dir(&self) -> PathBuf {
        self.root.join(&self.config.paths.tests_dir)
    }

    pub fn fixtures_dir(&self) -> PathBuf {
        self.root.join(&self.config.paths.fixtures_dir)
    }

    pub fn code_analyzer_path(&self) -> PathBuf {
        self.root.join(&self.config.paths.code_analyzer)
    }

    pub fn coverage_dir(&self) -> PathBuf {
        self.root.join(&self.config.paths.coverage_dir)
    }

    pub fn test_ruleset_path(&self) -> PathBuf {
        self.root.join(&self.config.paths.test_ruleset)
    }

    pub fn package_manifest(&self) -> PathBuf {
        self.root.join(&self.config.paths.package_manifest)
    }

    pub fn changelog_path(&self) -> PathBuf {
        self.root.join(&self.config.paths.changelog)
    }

    /// @ai:intent Path of a fixture for a rule
    /// @ai:effects pure
    pub fn fixture_path(&self, kind: FixtureKind, category: &str, rule: &str) -> PathBuf {
        self.fixtures_dir()
            .join(kind.to_string())
            .join(category)
            .join(format!("{}.cls", rule))
    }

    /// @ai:intent Path relative to the project root, for display
    /// @ai:effects pure
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// @ai:intent Rule category directories, sorted by name
    /// @ai:effects fs:read
    pub fn categories(&self) -> Result<Vec<String>> {
        let mut categories = Vec::new();
        for entry in std::fs::read_dir(self.rulesets_dir())? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                categories.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        categories.sort();
        Ok(categories)
    }

    /// @ai:intent Every XML rule file directly inside a category directory
    /// @ai:effects fs:read
    pub fn xml_rules(&self) -> Result<Vec<RuleFile>> {
        let mut rules = Vec::new();

        for category in self.categories()? {
            let category_dir = self.rulesets_dir().join(&category);
            let mut files: Vec<String> = std::fs::read_dir(&category_dir)?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .filter(|name| name.ends_with(".xml"))
                .collect();
            files.sort();

            for file in files {
                let name = file.trim_end_matches(".xml").to_string();
                rules.push(RuleFile {
                    kind: RuleKind::Xml,
                    category: category.clone(),
                    path: category_dir.join(&file),
                    file,
                    name,
                });
            }
        }

        Ok(rules)
    }

    /// @ai:intent Load code-analyzer.yml, if present
    /// @ai:effects fs:read
    pub fn code_analyzer(&self) -> Result<Option<CodeAnalyzerConfig>> {
        let path = self.code_analyzer_path();
        if !path.is_file() {
            return Ok(None);
        }
        CodeAnalyzerConfig::load(&path).map(Some)
    }

    /// @ai:intent Regex rules declared in code-analyzer.yml
    /// @ai:effects fs:read
    pub fn regex_rules(&self) -> Result<Vec<RuleFile>> {
        let path = self.code_analyzer_path();
        let Some(config) = self.code_analyzer()? else {
            return Ok(Vec::new());
        };

        Ok(config
            .rule_names()
            .into_iter()
            .map(|name| RuleFile {
                kind: RuleKind::Regex,
                category: "regex".to_string(),
                file: format!("{} (from code-analyzer.yml)", name),
                name,
                path: path.clone(),
            })
            .collect())
    }

    /// @ai:intent XML rules followed by regex rules
    /// @ai:effects fs:read
    pub fn all_rules(&self) -> Result<Vec<RuleFile>> {
        let mut rules = self.xml_rules()?;
        match self.regex_rules() {
            Ok(regex) => rules.extend(regex),
            Err(e) => warn!("Could not read regex rules: {}", e),
        }
        Ok(rules)
    }

    /// @ai:intent Test suite files, sorted by name
    /// @ai:effects fs:read
    pub fn test_files(&self) -> Result<Vec<PathBuf>> {
        let dir = self.tests_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let suffix = &self.config.tests.suffix;
        let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(suffix.as_str()))
            .map(|entry| entry.path())
            .collect();
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use tempfile::TempDir;

    pub const VALID_RULE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ruleset name="Naming" xmlns="http://pmd.sourceforge.net/ruleset/2.0.0">
    <rule name="NoAbbreviations" language="apex" message="Avoid abbreviations" class="net.sourceforge.pmd.lang.rule.xpath.XPathRule">
        <description>Variables should not be abbreviated. Version: 1.0.0</description>
        <priority>3</priority>
        <properties>
            <property name="xpath">
                <value>
<![CDATA[
//VariableDeclaration[@Image = 'ctx']
| //Parameter[@Image = 'idx']
]]>
                </value>
            </property>
        </properties>
    </rule>
</ruleset>
"#;

    /// Build a project in a temp dir from (relative path, content) pairs
    pub fn project_with(files: &[(&str, &str)]) -> (TempDir, Project) {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("rulesets")).unwrap();
        for (path, content) in files {
            let full = dir.path().join(path);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(full, content).unwrap();
        }
        let project = Project::new(dir.path(), ProjectConfig::default());
        (dir, project)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_discovers_xml_rules_sorted() {
        let (_dir, project) = project_with(&[
            ("rulesets/naming/Zeta.xml", VALID_RULE),
            ("rulesets/naming/Alpha.xml", VALID_RULE),
            ("rulesets/code-style/Beta.xml", VALID_RULE),
            ("rulesets/code-style/notes.txt", "ignored"),
        ]);

        let rules = project.xml_rules().unwrap();
        let names: Vec<(&str, &str)> = rules
            .iter()
            .map(|r| (r.category.as_str(), r.name.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![("code-style", "Beta"), ("naming", "Alpha"), ("naming", "Zeta")]
        );
        assert_eq!(rules[0].file, "Beta.xml");
        assert_eq!(rules[0].kind, RuleKind::Xml);
    }

    #[test]
    fn test_regex_rules_from_code_analyzer() {
        let (_dir, project) = project_with(&[(
            "code-analyzer.yml",
            "engines:\n  regex:\n    custom_rules:\n      NoLongLines:\n        regex: /.{81,}/g\n",
        )]);

        let rules = project.all_rules().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].kind, RuleKind::Regex);
        assert_eq!(rules[0].category, "regex");
        assert_eq!(rules[0].file, "NoLongLines (from code-analyzer.yml)");
    }

    #[test]
    fn test_test_files_filtered_by_suffix() {
        let (_dir, project) = project_with(&[
            ("tests/unit/naming.test.js", ""),
            ("tests/unit/code-style.test.js", ""),
            ("tests/unit/helper.js", ""),
        ]);

        let files: Vec<String> = project
            .test_files()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(files, vec!["code-style.test.js", "naming.test.js"]);
    }

    #[test]
    fn test_fixture_path_layout() {
        let (dir, project) = project_with(&[]);
        assert_eq!(
            project.fixture_path(FixtureKind::Negative, "naming", "NoAbbreviations"),
            dir.path()
                .join("tests/fixtures/negative/naming/NoAbbreviations.cls")
        );
    }

    #[test]
    fn test_missing_rulesets_dir_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let project = Project::new(dir.path(), ProjectConfig::default());
        assert!(project.xml_rules().is_err());
    }
}
