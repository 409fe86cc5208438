//! @ai:module:intent Typed view of PMD rule definitions in a ruleset document
//! @ai:module:layer domain
//! @ai:module:public_api RuleDefinition, Property, rule_definitions, extract_xpath, XPATH_RULE_CLASS
//! @ai:module:depends_on xml, error
//! @ai:module:stateless true

use crate::error::{read_to_string, Result};
use crate::xml::{Document, Element};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rule class every ruleset in the repository must use
pub const XPATH_RULE_CLASS: &str = "net.sourceforge.pmd.lang.rule.xpath.XPathRule";

/// @ai:intent A rule property such as the xpath expression
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Property {
    pub name: Option<String>,
    pub value: Option<String>,
}

/// @ai:intent A single `<rule>` element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleDefinition {
    pub name: Option<String>,
    pub language: Option<String>,
    pub message: Option<String>,
    pub class: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub properties: Vec<Property>,
    pub xpath: Option<String>,
}

impl RuleDefinition {
    /// @ai:intent Build a definition from a `<rule>` element
    /// @ai:effects pure
    pub fn from_element(rule: &Element) -> Self {
        let properties: Vec<Property> = rule
            .find_child("properties")
            .map(|props| {
                props
                    .child_elements()
                    .filter(|e| e.local_name() == "property")
                    .map(property_from_element)
                    .collect()
            })
            .unwrap_or_default();

        let xpath = properties
            .iter()
            .find(|p| p.name.as_deref() == Some("xpath"))
            .and_then(|p| p.value.clone());

        Self {
            name: rule.attr("name"),
            language: rule.attr("language"),
            message: rule.attr("message"),
            class: rule.attr("class"),
            description: rule.find_child("description").map(|d| d.text_content()),
            priority: rule
                .find_child("priority")
                .map(|p| p.text_content().trim().to_string()),
            properties,
            xpath,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unknown")
    }
}

fn property_from_element(property: &Element) -> Property {
    let value = property
        .find_child("value")
        .map(|v| v.text_content().trim().to_string())
        .or_else(|| property.attr("value"));
    Property {
        name: property.attr("name"),
        value,
    }
}

/// @ai:intent Every rule defined in a ruleset document, in document order
/// @ai:effects pure
pub fn rule_definitions(doc: &Document) -> Vec<RuleDefinition> {
    doc.elements("rule")
        .into_iter()
        .map(RuleDefinition::from_element)
        .collect()
}

/// @ai:intent XPath of the first xpath property in the document's first properties block
/// @ai:effects pure
pub fn xpath_of(doc: &Document) -> Option<String> {
    let properties = doc.elements("properties").into_iter().next()?;
    let xpath = properties
        .child_elements()
        .find(|p| p.local_name() == "property" && p.attr("name").as_deref() == Some("xpath"))?;
    let value = xpath.find_child("value")?;
    Some(value.text_content().trim().to_string())
}

/// @ai:intent Read a rule file and extract its XPath expression
/// @ai:effects fs:read
pub fn extract_xpath(path: &Path) -> Result<Option<String>> {
    let content = read_to_string(path)?;
    let doc = Document::parse(&content)?;
    Ok(xpath_of(&doc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::fixtures::VALID_RULE;

    #[test]
    fn test_rule_definition_fields() {
        let doc = Document::parse(VALID_RULE).unwrap();
        let rules = rule_definitions(&doc);

        assert_eq!(rules.len(), 1);
        let rule = &rules[0];
        assert_eq!(rule.name.as_deref(), Some("NoAbbreviations"));
        assert_eq!(rule.language.as_deref(), Some("apex"));
        assert_eq!(rule.class.as_deref(), Some(XPATH_RULE_CLASS));
        assert_eq!(rule.priority.as_deref(), Some("3"));
        assert_eq!(rule.properties.len(), 1);
        assert!(rule.description.as_deref().unwrap().contains("Version: 1.0.0"));
    }

    #[test]
    fn test_xpath_is_trimmed() {
        let doc = Document::parse(VALID_RULE).unwrap();
        assert_eq!(
            xpath_of(&doc).as_deref(),
            Some("//VariableDeclaration[@Image = 'ctx']\n| //Parameter[@Image = 'idx']")
        );
    }

    #[test]
    fn test_no_xpath_property() {
        let doc = Document::parse(
            r#"<ruleset><rule name="A"><properties><property name="other"><value>x</value></property></properties></rule></ruleset>"#,
        )
        .unwrap();
        assert_eq!(xpath_of(&doc), None);
        assert_eq!(rule_definitions(&doc)[0].xpath, None);
    }

    #[test]
    fn test_extract_xpath_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("Rule.xml");
        std::fs::write(&path, VALID_RULE).unwrap();
        assert!(extract_xpath(&path).unwrap().unwrap().starts_with("//VariableDeclaration"));
    }
}
