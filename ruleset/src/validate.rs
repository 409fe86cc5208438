//! @ai:module:intent Validate the structure of PMD ruleset XML files
//! @ai:module:layer application
//! @ai:module:public_api validate_rule_file, validate_rules, ValidationReport
//! @ai:module:depends_on xml, project, ruleset
//! @ai:module:stateless true

use crate::error::{read_to_string, Result};
use crate::project::Project;
use crate::ruleset::XPATH_RULE_CLASS;
use crate::xml::{Document, Element};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// @ai:intent Errors and warnings found while validating rule files
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationReport {
    pub files_checked: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// @ai:intent Validation passes when there are no errors
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.files_checked += other.files_checked;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

/// @ai:intent Validate every XML rule file of the project
/// @ai:effects fs:read
pub fn validate_rules(project: &Project) -> Result<ValidationReport> {
    let mut report = ValidationReport::default();
    for rule in project.xml_rules()? {
        report.merge(validate_rule_file(&rule.path));
    }
    Ok(report)
}

/// @ai:intent Validate a single ruleset file
/// @ai:effects fs:read
pub fn validate_rule_file(path: &Path) -> ValidationReport {
    let mut report = ValidationReport {
        files_checked: 1,
        ..Default::default()
    };
    let display = path.display().to_string();

    let content = match read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            report.errors.push(format!("{}: {}", display, e));
            return report;
        }
    };

    let Ok(doc) = Document::parse(&content) else {
        report.errors.push(format!("{}: XML parsing error", display));
        return report;
    };

    if doc.elements("ruleset").is_empty() {
        report
            .errors
            .push(format!("{}: No ruleset element found", display));
        return report;
    }

    let rules = doc.elements("rule");
    if rules.is_empty() {
        report
            .warnings
            .push(format!("{}: No rules found in ruleset", display));
    }

    for rule in rules {
        validate_rule(rule, &display, &mut report);
    }

    report
}

fn validate_rule(rule: &Element, file: &str, report: &mut ValidationReport) {
    let name = rule.attr("name").filter(|n| !n.is_empty());
    let prefix = format!(
        "{} (rule: {})",
        file,
        name.as_deref().unwrap_or("unknown")
    );

    if name.is_none() {
        report
            .errors
            .push(format!("{}: Missing 'name' attribute", prefix));
    }
    if is_blank(rule.attr("language")) {
        report
            .errors
            .push(format!("{}: Missing 'language' attribute", prefix));
    }
    if is_blank(rule.attr("message")) {
        report
            .warnings
            .push(format!("{}: Missing 'message' attribute", prefix));
    }
    if rule.attr("class").as_deref() != Some(XPATH_RULE_CLASS) {
        report
            .errors
            .push(format!("{}: Must use XPathRule class", prefix));
    }

    let Some(properties) = rule.descendants("properties").into_iter().next() else {
        report
            .errors
            .push(format!("{}: Missing 'properties' element", prefix));
        return;
    };

    let xpath = properties
        .descendants("property")
        .into_iter()
        .find(|p| p.attr("name").as_deref() == Some("xpath"));

    match xpath {
        None => report
            .errors
            .push(format!("{}: Missing 'xpath' property", prefix)),
        Some(property) => {
            let has_value = property
                .descendants("value")
                .first()
                .map(|v| !v.text_content().trim().is_empty())
                .unwrap_or(false);
            if !has_value {
                report
                    .errors
                    .push(format!("{}: XPath property has no value", prefix));
            }
        }
    }

    let description = rule.descendants("description").into_iter().next();
    let text = description.map(|d| d.text_content());
    if text.as_deref().map(str::trim).unwrap_or("").is_empty() {
        report
            .warnings
            .push(format!("{}: Missing or empty description", prefix));
    }
    if let Some(text) = text {
        if !text.contains("Version:") {
            report.warnings.push(format!(
                "{}: Description should include version information",
                prefix
            ));
        }
    }
}

fn is_blank(value: Option<String>) -> bool {
    value.map(|v| v.is_empty()).unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::fixtures::{project_with, VALID_RULE};

    fn validate(content: &str) -> ValidationReport {
        let (dir, _project) = project_with(&[("rulesets/naming/Rule.xml", content)]);
        validate_rule_file(&dir.path().join("rulesets/naming/Rule.xml"))
    }

    #[test]
    fn test_valid_rule_has_no_findings() {
        let report = validate(VALID_RULE);
        assert!(report.passed());
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[test]
    fn test_parse_error_stops_validation() {
        let report = validate("<ruleset><rule></ruleset>");
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].ends_with(": XML parsing error"));
    }

    #[test]
    fn test_missing_ruleset_element() {
        let report = validate("<rules/>");
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].ends_with(": No ruleset element found"));
    }

    #[test]
    fn test_empty_ruleset_warns() {
        let report = validate("<ruleset name=\"x\"></ruleset>");
        assert!(report.passed());
        assert!(report.warnings[0].ends_with(": No rules found in ruleset"));
    }

    #[test]
    fn test_missing_properties_skips_remaining_checks() {
        let report = validate(
            r#"<ruleset><rule name="Bare" language="apex" class="Other"></rule></ruleset>"#,
        );
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].contains("(rule: Bare): Must use XPathRule class"));
        assert!(report.errors[1].ends_with("Missing 'properties' element"));
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].ends_with("Missing 'message' attribute"));
    }

    #[test]
    fn test_blank_xpath_and_description_without_version() {
        let report = validate(
            r#"<ruleset>
  <rule name="R" language="apex" message="m" class="net.sourceforge.pmd.lang.rule.xpath.XPathRule">
    <description>No version here</description>
    <properties><property name="xpath"><value>   </value></property></properties>
  </rule>
</ruleset>"#,
        );
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].ends_with("(rule: R): XPath property has no value"));
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].ends_with("Description should include version information"));
    }

    #[test]
    fn test_missing_xpath_property() {
        let report = validate(
            r#"<ruleset><rule name="R" language="apex" message="m" class="net.sourceforge.pmd.lang.rule.xpath.XPathRule"><description>Version: 1.0.0</description><properties/></rule></ruleset>"#,
        );
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].ends_with("Missing 'xpath' property"));
    }

    #[test]
    fn test_validate_rules_aggregates() {
        let (_dir, project) = project_with(&[
            ("rulesets/naming/Good.xml", VALID_RULE),
            ("rulesets/naming/Bad.xml", "<nope/>"),
        ]);
        let report = validate_rules(&project).unwrap();
        assert_eq!(report.files_checked, 2);
        assert_eq!(report.errors.len(), 1);
    }
}
