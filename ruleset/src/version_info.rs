//! @ai:module:intent Add initial version lines to rule descriptions
//! @ai:module:layer application
//! @ai:module:public_api update_rule_file, add_version_info, INITIAL_VERSION_LINE
//! @ai:module:depends_on xml, project

use crate::error::{read_to_string, Result};
use crate::project::Project;
use crate::xml::{with_original_declaration, Document, Element};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Appended to descriptions that carry no version yet
pub const INITIAL_VERSION_LINE: &str = "\n\n\t\t\tVersion: 1.0.0";

/// @ai:intent Add a version line to every description lacking one
/// @ai:pre the file does not mention `Version:` anywhere
/// @ai:effects fs:read, fs:write
pub fn update_rule_file(path: &Path) -> Result<bool> {
    let content = read_to_string(path)?;
    if content.contains("Version:") {
        return Ok(false);
    }

    let mut doc = match Document::parse(&content) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Error parsing {}: {}", path.display(), e);
            return Ok(false);
        }
    };

    let mut updated = false;
    doc.visit_mut("rule", |rule| {
        rule.visit_mut("description", &mut |description: &mut Element| {
            let text = description.text_content();
            if !text.contains("Version:") {
                description.set_text(&format!("{}{}", text.trim(), INITIAL_VERSION_LINE));
                updated = true;
            }
        });
    });

    if updated {
        std::fs::write(path, with_original_declaration(&content, &doc.to_xml_string()))?;
    }
    Ok(updated)
}

/// @ai:intent Add version lines across the project, returning updated files
/// @ai:effects fs:read, fs:write
pub fn add_version_info(project: &Project) -> Result<Vec<PathBuf>> {
    let mut updated = Vec::new();
    for rule in project.xml_rules()? {
        if update_rule_file(&rule.path)? {
            updated.push(rule.path);
        }
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::fixtures::{project_with, VALID_RULE};

    const UNVERSIONED: &str = r#"<?xml version="1.0"?>
<ruleset name="Style">
	<rule name="A" language="apex">
		<description>
			Keep methods short &amp; focused.
		</description>
	</rule>
</ruleset>
"#;

    #[test]
    fn test_adds_version_line() {
        let (dir, _project) = project_with(&[("rulesets/style/A.xml", UNVERSIONED)]);
        let path = dir.path().join("rulesets/style/A.xml");

        assert!(update_rule_file(&path).unwrap());
        let updated = std::fs::read_to_string(&path).unwrap();
        assert!(updated.starts_with("<?xml version=\"1.0\"?>\n<ruleset"));
        assert!(updated.contains(
            "<description>Keep methods short &amp; focused.\n\n\t\t\tVersion: 1.0.0</description>"
        ));

        assert!(!update_rule_file(&path).unwrap());
    }

    #[test]
    fn test_versioned_file_is_untouched() {
        let (_dir, project) = project_with(&[
            ("rulesets/naming/Versioned.xml", VALID_RULE),
            ("rulesets/style/A.xml", UNVERSIONED),
        ]);

        let updated = add_version_info(&project).unwrap();
        assert_eq!(updated.len(), 1);
        assert!(updated[0].ends_with("A.xml"));
    }
}
