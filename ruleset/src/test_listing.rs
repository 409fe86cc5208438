//! @ai:module:intent Summarize the test suites the test runner will discover
//! @ai:module:layer application
//! @ai:module:public_api list_test_files, TestFileSummary

use crate::error::{read_to_string, Result};
use crate::project::Project;
use serde::{Deserialize, Serialize};

/// @ai:intent Block counts of one test file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestFileSummary {
    pub file: String,
    pub describes: usize,
    pub tests: usize,
}

/// @ai:intent Count describe and it blocks in each test file
/// @ai:effects fs:read
pub fn list_test_files(project: &Project) -> Result<Vec<TestFileSummary>> {
    project
        .test_files()?
        .into_iter()
        .map(|path| {
            let content = read_to_string(&path)?;
            Ok(TestFileSummary {
                file: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                describes: content.matches("describe(").count(),
                tests: content.matches("it(").count(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::fixtures::project_with;

    #[test]
    fn test_counts_blocks() {
        let (_dir, project) = project_with(&[
            (
                "tests/unit/naming.test.js",
                "describe('A', () => { describe('B', () => { it('x', f); it('y', f); }); });",
            ),
            ("tests/unit/empty.test.js", ""),
        ]);

        let summaries = list_test_files(&project).unwrap();
        assert_eq!(
            summaries,
            vec![
                TestFileSummary {
                    file: "empty.test.js".into(),
                    describes: 0,
                    tests: 0
                },
                TestFileSummary {
                    file: "naming.test.js".into(),
                    describes: 2,
                    tests: 2
                },
            ]
        );
    }
}
