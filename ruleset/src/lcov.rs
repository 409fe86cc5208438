//! @ai:module:intent Emit rule test coverage in lcov format for coverage dashboards
//! @ai:module:layer application
//! @ai:module:public_api render_lcov, generate_lcov, LcovSummary
//! @ai:module:depends_on project, coverage, ruleset

use crate::coverage::collect_tested_rules;
use crate::error::Result;
use crate::project::{Project, RuleFile, RuleKind};
use crate::ruleset::extract_xpath;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// @ai:intent Outcome of writing the lcov file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LcovSummary {
    pub path: PathBuf,
    pub total_rules: usize,
    pub covered: usize,
    pub percent: f64,
}

/// Number of reportable lines for a rule: non-blank XPath lines, at least one
fn line_count(rule: &RuleFile) -> usize {
    if rule.kind != RuleKind::Xml {
        return 1;
    }
    match extract_xpath(&rule.path) {
        Ok(Some(xpath)) if !xpath.is_empty() => xpath
            .lines()
            .filter(|line| !line.trim().is_empty())
            .count()
            .max(1),
        _ => 1,
    }
}

/// @ai:intent Render lcov records for a set of rules
/// @ai:effects fs:read
pub fn render_lcov(project: &Project, rules: &[RuleFile], tested: &BTreeSet<String>) -> String {
    let mut lines = vec!["TN:".to_string(), String::new()];

    for rule in rules {
        let covered = tested.contains(&rule.name);
        let total = line_count(rule);
        let hit = if covered { 1 } else { 0 };

        lines.push(format!("SF:{}", project.relative(&rule.path).display()));
        lines.push(format!("FN:1,{}", rule.name));
        lines.push("FNF:1".to_string());
        lines.push(format!("FNH:{}", hit));
        if covered {
            lines.push(format!("FNDA:1,{}", rule.name));
        }
        for i in 1..=total {
            lines.push(format!("DA:{},{}", i, hit));
        }
        lines.push(format!("LF:{}", total));
        lines.push(format!("LH:{}", if covered { total } else { 0 }));
        lines.push("end_of_record".to_string());
        lines.push(String::new());
    }

    lines.join("\n")
}

/// @ai:intent Write coverage/lcov.info for all rules
/// @ai:effects fs:read, fs:write
pub fn generate_lcov(project: &Project) -> Result<LcovSummary> {
    let rules = project.all_rules()?;
    let tested = collect_tested_rules(project)?;

    let coverage_dir = project.coverage_dir();
    std::fs::create_dir_all(&coverage_dir)?;
    let path = coverage_dir.join("lcov.info");
    std::fs::write(&path, render_lcov(project, &rules, &tested))?;

    // Counts every tested name, including ones without a matching rule
    let covered = tested.len();
    let percent = if rules.is_empty() {
        0.0
    } else {
        covered as f64 / rules.len() as f64 * 100.0
    };

    Ok(LcovSummary {
        path,
        total_rules: rules.len(),
        covered,
        percent,
    })
}
