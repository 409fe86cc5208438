//! @ai:module:intent Load and run regex rules declared in code-analyzer.yml
//! @ai:module:layer application
//! @ai:module:public_api CodeAnalyzerConfig, RegexRule, run_regex_rules, run_regex_rule
//! @ai:module:depends_on pmd, error

use crate::error::{read_to_string, Error, Result};
use crate::pmd::Violation;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// @ai:intent Subset of the Salesforce Code Analyzer configuration that carries regex rules
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodeAnalyzerConfig {
    #[serde(default)]
    engines: Option<Engines>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Engines {
    #[serde(default)]
    regex: Option<RegexEngine>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RegexEngine {
    #[serde(default)]
    custom_rules: serde_yaml::Mapping,
}

/// @ai:intent A single regex rule definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegexRule {
    pub regex: String,
    #[serde(default)]
    pub file_extensions: Option<Vec<String>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub violation_message: Option<String>,
    #[serde(default)]
    pub severity: Option<serde_yaml::Value>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CodeAnalyzerConfig {
    /// @ai:intent Parse configuration YAML; empty input yields no rules
    /// @ai:effects pure
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// @ai:intent Load configuration from a file
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        Self::parse(&read_to_string(path)?)
    }

    fn custom_rules(&self) -> Option<&serde_yaml::Mapping> {
        self.engines
            .as_ref()
            .and_then(|e| e.regex.as_ref())
            .map(|r| &r.custom_rules)
    }

    /// @ai:intent Rule names in declaration order
    /// @ai:effects pure
    pub fn rule_names(&self) -> Vec<String> {
        self.custom_rules()
            .map(|rules| {
                rules
                    .keys()
                    .filter_map(|k| k.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// @ai:intent All rules with their definitions, in declaration order
    /// @ai:effects pure
    pub fn rules(&self) -> Result<Vec<(String, RegexRule)>> {
        let Some(mapping) = self.custom_rules() else {
            return Ok(Vec::new());
        };

        let mut rules = Vec::with_capacity(mapping.len());
        for (key, value) in mapping {
            let Some(name) = key.as_str() else {
                continue;
            };
            let rule: RegexRule = serde_yaml::from_value(value.clone())?;
            rules.push((name.to_string(), rule));
        }
        Ok(rules)
    }

    /// @ai:intent Look up a single rule by name
    /// @ai:effects pure
    pub fn rule(&self, name: &str) -> Result<Option<RegexRule>> {
        Ok(self
            .rules()?
            .into_iter()
            .find(|(rule_name, _)| rule_name == name)
            .map(|(_, rule)| rule))
    }
}

impl RegexRule {
    /// @ai:intent Compile the rule pattern, accepting /pattern/flags or a bare pattern
    /// @ai:effects pure
    pub fn compile(&self, name: &str) -> Result<Regex> {
        let (pattern, flags) = split_delimited(&self.regex);

        let mut inline = String::new();
        for flag in flags.chars() {
            match flag {
                'i' | 'm' | 's' | 'x' => {
                    if !inline.contains(flag) {
                        inline.push(flag);
                    }
                }
                // global matching and unicode mode are implicit
                'g' | 'u' => {}
                other => {
                    return Err(Error::InvalidRegex {
                        rule: name.to_string(),
                        message: format!("unsupported flag '{}'", other),
                    })
                }
            }
        }

        let full = if inline.is_empty() {
            pattern.to_string()
        } else {
            format!("(?{}){}", inline, pattern)
        };

        Regex::new(&full).map_err(|e| Error::InvalidRegex {
            rule: name.to_string(),
            message: e.to_string(),
        })
    }

    /// @ai:intent Whether the rule applies to the given file
    /// @ai:effects pure
    pub fn applies_to(&self, path: &Path) -> bool {
        let Some(extensions) = &self.file_extensions else {
            return true;
        };
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        extensions.iter().any(|ext| {
            let ext = ext.to_lowercase();
            if ext.starts_with('.') {
                file_name.ends_with(&ext)
            } else {
                file_name.ends_with(&format!(".{}", ext))
            }
        })
    }

    fn message(&self, name: &str) -> String {
        self.violation_message
            .clone()
            .or_else(|| self.description.clone())
            .unwrap_or_else(|| name.to_string())
    }
}

fn split_delimited(raw: &str) -> (&str, &str) {
    if let Some(rest) = raw.strip_prefix('/') {
        if let Some(end) = rest.rfind('/') {
            let flags = &rest[end + 1..];
            if flags.chars().all(|c| c.is_ascii_alphabetic()) {
                return (&rest[..end], flags);
            }
        }
    }
    (raw, "")
}

/// @ai:intent Match one compiled rule against source text
/// @ai:effects pure
pub fn match_source(name: &str, rule: &RegexRule, regex: &Regex, file: &str, content: &str) -> Vec<Violation> {
    regex
        .find_iter(content)
        .map(|m| {
            let prefix = &content[..m.start()];
            let line = prefix.matches('\n').count() + 1;
            let column = prefix.rsplit('\n').next().unwrap_or("").chars().count() + 1;
            Violation {
                file: file.to_string(),
                rule: name.to_string(),
                message: rule.message(name),
                line: line as u32,
                column: column as u32,
            }
        })
        .collect()
}

/// @ai:intent Run every regex rule against the given files
/// @ai:effects fs:read
pub fn run_regex_rules(config: &CodeAnalyzerConfig, paths: &[PathBuf]) -> Result<Vec<Violation>> {
    let mut violations = Vec::new();

    for (name, rule) in config.rules()? {
        let regex = rule.compile(&name)?;
        for path in paths.iter().filter(|p| rule.applies_to(p)) {
            let content = read_to_string(path)?;
            violations.extend(match_source(
                &name,
                &rule,
                &regex,
                &path.display().to_string(),
                &content,
            ));
        }
    }

    Ok(violations)
}

/// @ai:intent Run a single named regex rule against one file
/// @ai:effects fs:read
pub fn run_regex_rule(config: &CodeAnalyzerConfig, name: &str, path: &Path) -> Result<Vec<Violation>> {
    let rule = config.rule(name)?.ok_or_else(|| Error::InvalidRegex {
        rule: name.to_string(),
        message: "rule not found in code-analyzer configuration".to_string(),
    })?;
    let regex = rule.compile(name)?;
    let content = read_to_string(path)?;
    Ok(match_source(name, &rule, &regex, &path.display().to_string(), &content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
engines:
  pmd:
    custom_rulesets: []
  regex:
    custom_rules:
      NoConsecutiveBlankLines:
        regex: /\n\s*\n\s*\n/g
        file_extensions: [".cls", ".trigger"]
        description: "Avoid consecutive blank lines"
        violation_message: "Consecutive blank lines"
        severity: 3
        tags: ["CodeStyle"]
      ProhibitSuppressWarnings:
        regex: /@SuppressWarnings|NOPMD/gi
        file_extensions: [".cls"]
        description: "Do not suppress warnings"
      AnyFile:
        regex: TODO
"#;

    #[test]
    fn test_rule_names_keep_declaration_order() {
        let config = CodeAnalyzerConfig::parse(CONFIG).unwrap();
        assert_eq!(
            config.rule_names(),
            vec!["NoConsecutiveBlankLines", "ProhibitSuppressWarnings", "AnyFile"]
        );
    }

    #[test]
    fn test_missing_regex_section_has_no_rules() {
        let config = CodeAnalyzerConfig::parse("engines:\n  pmd: {}\n").unwrap();
        assert!(config.rule_names().is_empty());
        assert!(config.rules().unwrap().is_empty());
        assert!(CodeAnalyzerConfig::parse("").unwrap().rule_names().is_empty());
    }

    #[test]
    fn test_compile_maps_flags() {
        let rule = RegexRule {
            regex: "/nopmd/gi".to_string(),
            file_extensions: None,
            description: None,
            violation_message: None,
            severity: None,
            tags: vec![],
        };
        let regex = rule.compile("R").unwrap();
        assert!(regex.is_match("// NOPMD"));
    }

    #[test]
    fn test_compile_rejects_unknown_flag() {
        let rule = RegexRule {
            regex: "/abc/q".to_string(),
            file_extensions: None,
            description: None,
            violation_message: None,
            severity: None,
            tags: vec![],
        };
        assert!(matches!(rule.compile("R"), Err(Error::InvalidRegex { .. })));
    }

    #[test]
    fn test_applies_to_extensions() {
        let config = CodeAnalyzerConfig::parse(CONFIG).unwrap();
        let rule = config.rule("ProhibitSuppressWarnings").unwrap().unwrap();
        assert!(rule.applies_to(Path::new("classes/Foo.cls")));
        assert!(!rule.applies_to(Path::new("triggers/Foo.trigger")));

        let any = config.rule("AnyFile").unwrap().unwrap();
        assert!(any.applies_to(Path::new("README.md")));
    }

    #[test]
    fn test_run_reports_line_and_column() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("Foo.cls");
        std::fs::write(
            &file,
            "public class Foo {\n    @SuppressWarnings('PMD')\n    void a() {} // nopmd\n}\n",
        )
        .unwrap();

        let config = CodeAnalyzerConfig::parse(CONFIG).unwrap();
        let violations = run_regex_rule(&config, "ProhibitSuppressWarnings", &file).unwrap();

        assert_eq!(violations.len(), 2);
        assert_eq!((violations[0].line, violations[0].column), (2, 5));
        assert_eq!((violations[1].line, violations[1].column), (3, 20));
        assert_eq!(violations[0].message, "Do not suppress warnings");
    }

    #[test]
    fn test_run_all_rules_filters_by_extension() {
        let dir = TempDir::new().unwrap();
        let cls = dir.path().join("A.cls");
        let txt = dir.path().join("notes.txt");
        std::fs::write(&cls, "a\n\n\n\nb // TODO\n").unwrap();
        std::fs::write(&txt, "TODO\n@SuppressWarnings\n").unwrap();

        let config = CodeAnalyzerConfig::parse(CONFIG).unwrap();
        let violations = run_regex_rules(&config, &[cls, txt]).unwrap();

        let rules: Vec<&str> = violations.iter().map(|v| v.rule.as_str()).collect();
        assert_eq!(rules, vec!["NoConsecutiveBlankLines", "AnyFile", "AnyFile"]);
        assert_eq!(violations[0].message, "Consecutive blank lines");
    }

    #[test]
    fn test_unknown_rule_is_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("A.cls");
        std::fs::write(&file, "x").unwrap();
        let config = CodeAnalyzerConfig::parse(CONFIG).unwrap();
        assert!(run_regex_rule(&config, "Missing", &file).is_err());
    }
}
