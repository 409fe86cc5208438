//! @ai:module:intent Estimate how well rule fixtures exercise each XPath expression
//! @ai:module:layer application
//! @ai:module:public_api analyze_xpath, check_fixture_coverage, check_xpath_coverage, XPathAnalysis, FixtureCoverage, CoverageStatus, XPathCoverageReport
//! @ai:module:depends_on ruleset, project
//!
//! This is a keyword heuristic over fixture source text, not an evaluation of the
//! XPath against a syntax tree.

use crate::error::Result;
use crate::project::{FixtureKind, Project};
use crate::ruleset::extract_xpath;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

static NODE_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:^|\s|\(|\[|,|\|)([A-Z][a-zA-Z]*(?:Statement|Expression|Declaration|Method|Class|Field|Block|Condition|Loop|Type|Node))(?:\s*\[|\s*\(|\s*/|\s*$|\s*,|\s*\|)",
    )
    .unwrap()
});
static OPERATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"@Op\s*=\s*['"]([^'"]+)['"]"#).unwrap());
static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@([A-Z][a-zA-Z]*)\s*=").unwrap());

/// Bare node names accepted in addition to the *Statement/*Expression/*Declaration families
const STANDALONE_NODE_TYPES: [&str; 8] = [
    "Method",
    "Class",
    "Field",
    "Block",
    "Condition",
    "Loop",
    "Type",
    "FormalComment",
];

/// @ai:intent Structural facts extracted from an XPath expression
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct XPathAnalysis {
    pub node_types: Vec<String>,
    pub operators: Vec<String>,
    pub attributes: Vec<String>,
    pub has_unions: bool,
    pub has_let_expressions: bool,
}

/// @ai:intent Which fixtures exist for a rule and which node types they exercise
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FixtureCoverage {
    pub has_negative_fixture: bool,
    pub has_positive_fixture: bool,
    pub covered_node_types: Vec<String>,
    pub missing_node_types: Vec<String>,
}

/// @ai:intent Coverage verdict for one XML rule
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CoverageStatus {
    NoXpath,
    NotCovered,
    Partial,
    Covered,
}

/// @ai:intent Coverage details for one XML rule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleXPathCoverage {
    pub rule_name: String,
    pub category: String,
    pub status: CoverageStatus,
    pub message: String,
    pub node_types: Vec<String>,
    pub missing_node_types: Vec<String>,
}

/// @ai:intent Aggregated XPath coverage for a project
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct XPathCoverageReport {
    pub total_rules: usize,
    pub fully_covered: usize,
    pub partially_covered: usize,
    pub not_covered: usize,
    pub results: Vec<RuleXPathCoverage>,
}

impl XPathCoverageReport {
    /// @ai:intent Share of all rules, in percent; zero for an empty project
    pub fn percent(&self, count: usize) -> f64 {
        if self.total_rules == 0 {
            0.0
        } else {
            count as f64 / self.total_rules as f64 * 100.0
        }
    }

    /// @ai:intent Rules whose status is anything but covered
    pub fn issues(&self) -> impl Iterator<Item = &RuleXPathCoverage> {
        self.results
            .iter()
            .filter(|r| r.status != CoverageStatus::Covered)
    }

    pub fn exit_code(&self) -> u8 {
        if self.issues().next().is_none() {
            0
        } else {
            1
        }
    }
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

/// @ai:intent Extract node types, operators and attribute checks from an XPath expression
/// @ai:effects pure
pub fn analyze_xpath(xpath: &str) -> XPathAnalysis {
    let mut analysis = XPathAnalysis::default();

    for captures in NODE_TYPE.captures_iter(xpath) {
        let node_type = &captures[1];
        let is_ast_node = node_type.ends_with("Statement")
            || node_type.ends_with("Expression")
            || node_type.ends_with("Declaration")
            || STANDALONE_NODE_TYPES.iter().any(|t| *t == node_type);
        if node_type.len() > 3 && node_type != "ModifierNode" && is_ast_node {
            push_unique(&mut analysis.node_types, node_type);
        }
    }

    for captures in OPERATOR.captures_iter(xpath) {
        push_unique(&mut analysis.operators, &captures[1]);
    }

    for captures in ATTRIBUTE.captures_iter(xpath) {
        push_unique(&mut analysis.attributes, &captures[1]);
    }

    analysis.has_unions = xpath.contains('|') && !xpath.contains("||");
    analysis.has_let_expressions = xpath.contains("let ");
    analysis
}

/// @ai:intent Source keywords suggesting a fixture exercises a node type
/// @ai:effects pure
pub fn node_type_keywords(node_type: &str) -> &'static [&'static str] {
    match node_type {
        "IfBlockStatement" => &["if", "else if"],
        "IfElseBlockStatement" => &["if", "else if", "else"],
        "WhileLoopStatement" => &["while"],
        "ForLoopStatement" => &["for"],
        "SwitchStatement" => &["switch"],
        "TernaryExpression" => &["?", ":", "ternary"],
        "MethodCallExpression" => &["(", "method"],
        "VariableExpression" => &[
            "variable", "var", "=", "String", "Integer", "Boolean", "Object", "List", "Map", "Set",
        ],
        "VariableDeclaration" => &["=", "declaration", "String", "Integer", "Boolean"],
        "Method" => &["method", "function", "void", "public", "private"],
        "Field" => &["field", "property", "static", "final"],
        "Class" => &["class"],
        "BlockStatement" => &["{", "}", "block"],
        "NewMapInitExpression" => &["new Map", "Map<", "Map("],
        "ReferenceExpression" => &["reference", "ref", ".", "this.", "super."],
        "FormalComment" => &["/**", "*/", "apexdoc"],
        "BinaryExpression" => &["==", "!=", "<", ">", "<=", ">="],
        _ => &[],
    }
}

/// @ai:intent Check fixture presence and keyword coverage for a rule
/// @ai:effects fs:read
pub fn check_fixture_coverage(
    project: &Project,
    rule: &str,
    category: &str,
    analysis: &XPathAnalysis,
) -> FixtureCoverage {
    let negative = project.fixture_path(FixtureKind::Negative, category, rule);
    let positive = project.fixture_path(FixtureKind::Positive, category, rule);

    let mut coverage = FixtureCoverage {
        has_negative_fixture: negative.is_file(),
        has_positive_fixture: positive.is_file(),
        ..Default::default()
    };

    let read = |path: &std::path::Path| std::fs::read_to_string(path).unwrap_or_default();
    let content = format!("{} {}", read(&negative), read(&positive)).to_lowercase();

    for node_type in &analysis.node_types {
        let covered = node_type_keywords(node_type)
            .iter()
            .any(|keyword| content.contains(&keyword.to_lowercase()));
        if covered {
            coverage.covered_node_types.push(node_type.clone());
        } else {
            coverage.missing_node_types.push(node_type.clone());
        }
    }

    coverage
}

/// @ai:intent Check XPath coverage for every XML rule of the project
/// @ai:effects fs:read
pub fn check_xpath_coverage(project: &Project) -> Result<XPathCoverageReport> {
    let mut report = XPathCoverageReport::default();

    for rule in project.xml_rules()? {
        report.total_rules += 1;

        let xpath = extract_xpath(&rule.path).unwrap_or_else(|e| {
            warn!("Could not read XPath from {}: {}", rule.path.display(), e);
            None
        });
        let Some(xpath) = xpath.filter(|x| !x.is_empty()) else {
            report.results.push(RuleXPathCoverage {
                rule_name: rule.name,
                category: rule.category,
                status: CoverageStatus::NoXpath,
                message: "No XPath expression found".to_string(),
                node_types: Vec::new(),
                missing_node_types: Vec::new(),
            });
            continue;
        };

        let analysis = analyze_xpath(&xpath);
        let fixtures = check_fixture_coverage(project, &rule.name, &rule.category, &analysis);

        let mut message = String::new();
        let status = if !(fixtures.has_negative_fixture && fixtures.has_positive_fixture) {
            report.not_covered += 1;
            if !fixtures.has_negative_fixture {
                message.push_str("Missing negative fixture. ");
            }
            if !fixtures.has_positive_fixture {
                message.push_str("Missing positive fixture. ");
            }
            CoverageStatus::NotCovered
        } else if !fixtures.missing_node_types.is_empty() {
            report.partially_covered += 1;
            message = format!(
                "Missing coverage for node types: {}. ",
                fixtures.missing_node_types.join(", ")
            );
            CoverageStatus::Partial
        } else {
            report.fully_covered += 1;
            CoverageStatus::Covered
        };

        if analysis.has_unions {
            message.push_str("XPath contains union operators (|) - ensure all branches are tested. ");
        }
        if analysis.has_let_expressions {
            message.push_str("XPath contains let expressions - ensure all conditions are tested. ");
        }

        report.results.push(RuleXPathCoverage {
            rule_name: rule.name,
            category: rule.category,
            status,
            message: message.trim().to_string(),
            node_types: analysis.node_types,
            missing_node_types: fixtures.missing_node_types,
        });
    }

    Ok(report)
}
