//! @ai:module:intent Combine every rule into a single ruleset used by the test suites
//! @ai:module:layer application
//! @ai:module:public_api render_combined_ruleset, generate_test_ruleset
//! @ai:module:depends_on xml, project

use crate::error::{read_to_string, Result};
use crate::project::Project;
use crate::xml::{strip_declarations, Document};
use std::path::PathBuf;

const RULESET_NAME: &str = "Combined Test Ruleset";
const RULESET_DESCRIPTION: &str = "Combined ruleset for testing all rules";

/// @ai:intent Wrap serialized rule elements in a PMD 2.0.0 ruleset
/// @ai:effects pure
pub fn render_combined_ruleset(rules: &[String]) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" ?>
<ruleset
    name="{}"
    xmlns="http://pmd.sourceforge.net/ruleset/2.0.0"
    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
    xsi:schemaLocation="http://pmd.sourceforge.net/ruleset/2.0.0 https://pmd.sourceforge.io/ruleset_2_0_0.xsd"
>
    <description>{}</description>

"#,
        RULESET_NAME, RULESET_DESCRIPTION
    );

    for rule in rules {
        xml.push_str("    ");
        xml.push_str(strip_declarations(rule).trim());
        xml.push_str("\n\n");
    }

    xml.push_str("</ruleset>\n");
    xml
}

/// @ai:intent Write the combined ruleset, returning its path and rule count
/// @ai:effects fs:read, fs:write
pub fn generate_test_ruleset(project: &Project) -> Result<(PathBuf, usize)> {
    let mut rules = Vec::new();
    for rule_file in project.xml_rules()? {
        let doc = Document::parse(&read_to_string(&rule_file.path)?)?;
        rules.extend(doc.elements("rule").iter().map(|rule| rule.to_xml_string()));
    }

    let output = project.test_ruleset_path();
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&output, render_combined_ruleset(&rules))?;

    Ok((output, rules.len()))
}
