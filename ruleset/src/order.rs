//! @ai:module:intent Check and fix the child element order of PMD rules
//! @ai:module:layer application
//! @ai:module:public_api check_rule_file, check_element_order, fix_rule_file, fix_element_order, OrderMismatch, CANONICAL_ORDER
//! @ai:module:depends_on xml, project
//! @ai:module:stateless true
//!
//! The PMD ruleset schema expects `description, priority, properties, exclude*, example*`.

use crate::error::{read_to_string, Result};
use crate::project::Project;
use crate::xml::{with_original_declaration, Document, Element, Node};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Child elements of `<rule>` whose relative order is enforced
pub const CANONICAL_ORDER: [&str; 5] = ["description", "priority", "properties", "exclude", "example"];

/// @ai:intent Element order of a rule that differs from the schema order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderMismatch {
    pub rule: Option<String>,
    pub order: Vec<String>,
    pub expected: Vec<String>,
}

/// @ai:intent A file whose rules are out of order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderReport {
    pub file: PathBuf,
    #[serde(flatten)]
    pub mismatch: OrderMismatch,
}

fn is_tracked(name: &str) -> bool {
    CANONICAL_ORDER.iter().any(|tracked| *tracked == name)
}

/// @ai:intent Current and expected tracked element sequences for a rule
/// @ai:effects pure
fn orders(rule: &Element) -> (Vec<String>, Vec<String>) {
    let current: Vec<String> = rule
        .child_elements()
        .map(Element::local_name)
        .filter(|name| is_tracked(name))
        .map(str::to_string)
        .collect();

    let count = |name: &str| current.iter().filter(|n| n.as_str() == name).count();

    let mut expected = Vec::new();
    for single in ["description", "priority", "properties"] {
        if count(single) > 0 {
            expected.push(single.to_string());
        }
    }
    for repeated in ["exclude", "example"] {
        expected.extend(std::iter::repeat(repeated.to_string()).take(count(repeated)));
    }

    (current, expected)
}

/// @ai:intent First rule in a document whose element order is wrong
/// @ai:effects pure
pub fn check_document(doc: &Document) -> Option<OrderMismatch> {
    doc.elements("rule").into_iter().find_map(|rule| {
        let (order, expected) = orders(rule);
        (order != expected).then(|| OrderMismatch {
            rule: rule.attr("name"),
            order,
            expected,
        })
    })
}

/// @ai:intent Check one ruleset file; unreadable files count as correct
/// @ai:effects fs:read
pub fn check_rule_file(path: &Path) -> Option<OrderMismatch> {
    let parsed = read_to_string(path).and_then(|content| Document::parse(&content));
    match parsed {
        Ok(doc) => check_document(&doc),
        Err(e) => {
            warn!("Error parsing {}: {}", path.display(), e);
            None
        }
    }
}

/// @ai:intent Check every XML rule file of the project
/// @ai:effects fs:read
pub fn check_element_order(project: &Project) -> Result<Vec<OrderReport>> {
    Ok(project
        .xml_rules()?
        .into_iter()
        .filter_map(|rule| {
            check_rule_file(&rule.path).map(|mismatch| OrderReport {
                file: rule.path,
                mismatch,
            })
        })
        .collect())
}

/// @ai:intent Reorder the children of a rule in place
/// @ai:effects mutation
fn reorder_rule(rule: &mut Element) -> bool {
    let (current, expected) = orders(rule);
    if current == expected {
        return false;
    }

    let separator = match rule.children.first() {
        Some(Node::Text(t)) if is_whitespace(t) => Some(t.clone()),
        _ => None,
    };
    let closing = match rule.children.last() {
        Some(Node::Text(t)) if is_whitespace(t) && rule.children.len() > 1 => Some(t.clone()),
        _ => None,
    };

    let mut others = Vec::new();
    let mut singles: [Option<Node>; 3] = [None, None, None];
    let mut excludes = Vec::new();
    let mut examples = Vec::new();

    for node in std::mem::take(&mut rule.children) {
        let name = match &node {
            Node::Text(t) if is_whitespace(t) => continue,
            Node::Element(e) => e.local_name().to_string(),
            _ => {
                others.push(node);
                continue;
            }
        };

        let slot = match name.as_str() {
            "description" => Some(0),
            "priority" => Some(1),
            "properties" => Some(2),
            _ => None,
        };
        if let Some(slot) = slot {
            // Only the first occurrence is kept
            if singles[slot].is_none() {
                singles[slot] = Some(node);
            } else {
                warn!("Dropping duplicate <{}> in rule {:?}", name, rule.attr("name"));
            }
            continue;
        }

        match name.as_str() {
            "exclude" => excludes.push(node),
            "example" => examples.push(node),
            _ => others.push(node),
        }
    }

    let ordered = others
        .into_iter()
        .chain(singles.into_iter().flatten())
        .chain(excludes)
        .chain(examples);

    match separator {
        Some(separator) => {
            for node in ordered {
                rule.children.push(Node::Text(separator.clone()));
                rule.children.push(node);
            }
            rule.children.push(Node::Text(closing.unwrap_or_else(|| "\n".to_string())));
        }
        None => rule.children.extend(ordered),
    }

    true
}

fn is_whitespace(text: &str) -> bool {
    text.trim().is_empty()
}

/// @ai:intent Fix element order in one file, returning whether it changed
/// @ai:effects fs:read, fs:write
pub fn fix_rule_file(path: &Path) -> Result<bool> {
    let content = read_to_string(path)?;
    let mut doc = match Document::parse(&content) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Error parsing {}: {}", path.display(), e);
            return Ok(false);
        }
    };

    let mut changed = false;
    doc.visit_mut("rule", |rule| {
        if reorder_rule(rule) {
            changed = true;
        }
    });

    if changed {
        let output = with_original_declaration(&content, &doc.to_xml_string());
        std::fs::write(path, output)?;
    }

    Ok(changed)
}

/// @ai:intent Fix every XML rule file of the project, returning the fixed paths
/// @ai:effects fs:read, fs:write
pub fn fix_element_order(project: &Project) -> Result<Vec<PathBuf>> {
    let mut fixed = Vec::new();
    for rule in project.xml_rules()? {
        if fix_rule_file(&rule.path)? {
            info!("Fixed: {}", rule.path.display());
            fixed.push(rule.path);
        }
    }
    Ok(fixed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::fixtures::{project_with, VALID_RULE};

    const OUT_OF_ORDER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ruleset name="Naming">
    <rule name="Swapped" language="apex">
        <example>code</example>
        <properties><property name="xpath"><value>//Method</value></property></properties>
        <description>Swapped. Version: 1.0.0</description>
        <priority>3</priority>
    </rule>
</ruleset>
"#;

    #[test]
    fn test_ordered_rule_passes() {
        let doc = Document::parse(VALID_RULE).unwrap();
        assert_eq!(check_document(&doc), None);
    }

    #[test]
    fn test_detects_wrong_order() {
        let doc = Document::parse(OUT_OF_ORDER).unwrap();
        let mismatch = check_document(&doc).unwrap();
        assert_eq!(mismatch.rule.as_deref(), Some("Swapped"));
        assert_eq!(
            mismatch.order,
            vec!["example", "properties", "description", "priority"]
        );
        assert_eq!(
            mismatch.expected,
            vec!["description", "priority", "properties", "example"]
        );
    }

    #[test]
    fn test_untracked_elements_are_ignored_by_check() {
        let doc = Document::parse(
            "<ruleset><rule name=\"A\"><custom/><description>d</description><priority>1</priority></rule></ruleset>",
        )
        .unwrap();
        assert_eq!(check_document(&doc), None);
    }

    #[test]
    fn test_fix_reorders_and_reindents() {
        let (dir, _project) = project_with(&[("rulesets/naming/Swapped.xml", OUT_OF_ORDER)]);
        let path = dir.path().join("rulesets/naming/Swapped.xml");

        assert!(fix_rule_file(&path).unwrap());
        let fixed = std::fs::read_to_string(&path).unwrap();

        assert_eq!(
            fixed,
            r#"<?xml version="1.0" encoding="UTF-8"?>
<ruleset name="Naming">
    <rule name="Swapped" language="apex">
        <description>Swapped. Version: 1.0.0</description>
        <priority>3</priority>
        <properties><property name="xpath"><value>//Method</value></property></properties>
        <example>code</example>
    </rule>
</ruleset>
"#
        );
        assert_eq!(check_rule_file(&path), None);
        assert!(!fix_rule_file(&path).unwrap());
    }

    #[test]
    fn test_fix_keeps_untracked_elements_first() {
        let (dir, _project) = project_with(&[(
            "rulesets/naming/A.xml",
            "<ruleset><rule name=\"A\"><priority>1</priority><custom/><description>d</description></rule></ruleset>",
        )]);
        let path = dir.path().join("rulesets/naming/A.xml");

        assert!(fix_rule_file(&path).unwrap());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "<ruleset><rule name=\"A\"><custom/><description>d</description><priority>1</priority></rule></ruleset>"
        );
    }

    #[test]
    fn test_fix_drops_duplicate_single_elements() {
        let (dir, _project) = project_with(&[(
            "rulesets/naming/Dup.xml",
            "<ruleset><rule name=\"Dup\"><priority>3</priority><description>a</description><description>b</description></rule></ruleset>",
        )]);
        let path = dir.path().join("rulesets/naming/Dup.xml");

        assert!(fix_rule_file(&path).unwrap());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "<ruleset><rule name=\"Dup\"><description>a</description><priority>3</priority></rule></ruleset>"
        );
        assert_eq!(check_rule_file(&path), None);
        assert!(!fix_rule_file(&path).unwrap());
    }

    #[test]
    fn test_project_level_check_and_fix() {
        let (_dir, project) = project_with(&[
            ("rulesets/naming/Good.xml", VALID_RULE),
            ("rulesets/naming/Swapped.xml", OUT_OF_ORDER),
            ("rulesets/naming/Broken.xml", "<ruleset>"),
        ]);

        let reports = check_element_order(&project).unwrap();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].file.ends_with("Swapped.xml"));

        assert_eq!(fix_element_order(&project).unwrap().len(), 1);
        assert!(check_element_order(&project).unwrap().is_empty());
    }
}
