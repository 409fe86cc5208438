//! @ai:module:intent Report which rules are referenced by at least one test suite
//! @ai:module:layer application
//! @ai:module:public_api collect_tested_rules, check_rule_coverage, RuleCoverageReport
//! @ai:module:depends_on project

use crate::error::{read_to_string, Result};
use crate::project::{Project, RuleFile};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

static RULESET_REFERENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"rulesets/[A-Za-z0-9_-]+/([A-Za-z0-9_]+)\.xml").unwrap());
static DESCRIBE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r#"describe\(['"]([A-Za-z0-9_]+)['"]"#).unwrap());

/// @ai:intent Rules split by whether a test references them
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleCoverageReport {
    pub total: usize,
    pub covered: Vec<RuleFile>,
    pub uncovered: Vec<RuleFile>,
}

impl RuleCoverageReport {
    /// @ai:intent Percentage rounded to one decimal; zero without rules
    pub fn percent(&self, count: usize) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (count as f64 / self.total as f64 * 1000.0).round() / 10.0
    }

    pub fn passed(&self) -> bool {
        self.uncovered.is_empty()
    }
}

/// @ai:intent Rule names mentioned in a test source
/// @ai:effects pure
pub fn tested_rules_in(content: &str, into: &mut BTreeSet<String>) {
    for captures in RULESET_REFERENCE.captures_iter(content) {
        into.insert(captures[1].to_string());
    }
    for captures in DESCRIBE_NAME.captures_iter(content) {
        into.insert(captures[1].to_string());
    }
}

/// @ai:intent Names of all rules referenced by the project's test files
/// @ai:effects fs:read
pub fn collect_tested_rules(project: &Project) -> Result<BTreeSet<String>> {
    let mut tested = BTreeSet::new();
    for file in project.test_files()? {
        tested_rules_in(&read_to_string(&file)?, &mut tested);
    }
    Ok(tested)
}

/// @ai:intent Split all XML and regex rules into covered and uncovered
/// @ai:effects fs:read
pub fn check_rule_coverage(project: &Project) -> Result<RuleCoverageReport> {
    let tested = collect_tested_rules(project)?;
    let rules = project.all_rules()?;

    let total = rules.len();
    let (covered, uncovered) = rules
        .into_iter()
        .partition(|rule| tested.contains(&rule.name));

    Ok(RuleCoverageReport {
        total,
        covered,
        uncovered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::fixtures::{project_with, VALID_RULE};

    const SUITE: &str = r#"
describe('Naming Rules', () => {
    describe('NoAbbreviations', () => {
        it('flags ctx', async () => {
            await runPMD('rulesets/naming/NoAbbreviations.xml', 'x.cls');
        });
    });
    describe("NoLongLines", () => {});
});
"#;

    #[test]
    fn test_collects_ruleset_paths_and_describes() {
        let mut names = BTreeSet::new();
        tested_rules_in(SUITE, &mut names);
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["NoAbbreviations", "NoLongLines"]);
    }

    #[test]
    fn test_rule_names_are_ascii_words() {
        let mut names = BTreeSet::new();
        tested_rules_in("describe('Règle', () => {});\nrunPMD('rulesets/naming/Café.xml');", &mut names);
        assert!(names.is_empty());
    }

    #[test]
    fn test_rule_coverage_report() {
        let (_dir, project) = project_with(&[
            ("rulesets/naming/NoAbbreviations.xml", VALID_RULE),
            ("rulesets/naming/Untested.xml", VALID_RULE),
            (
                "code-analyzer.yml",
                "engines:\n  regex:\n    custom_rules:\n      NoLongLines:\n        regex: x\n",
            ),
            ("tests/unit/naming.test.js", SUITE),
        ]);

        let report = check_rule_coverage(&project).unwrap();
        assert_eq!(report.total, 3);
        assert_eq!(report.covered.len(), 2);
        assert_eq!(report.uncovered.len(), 1);
        assert_eq!(report.uncovered[0].name, "Untested");
        assert_eq!(report.percent(report.covered.len()), 66.7);
        assert!(!report.passed());
    }
}
