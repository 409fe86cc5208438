//! @ai:module:intent Generate CHANGELOG.md from commit subjects
//! @ai:module:layer application
//! @ai:module:public_api Commit, ChangeType, categorize, parse_log_line, render_changelog, generate_changelog
//! @ai:module:depends_on git, versioning, project

use crate::error::Result;
use crate::git::GitRepository;
use crate::project::Project;
use crate::versioning::package_version_string;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// @ai:intent Changelog section a commit belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Changed,
    Fixed,
    Removed,
}

impl ChangeType {
    const ALL: [ChangeType; 4] = [
        ChangeType::Added,
        ChangeType::Changed,
        ChangeType::Fixed,
        ChangeType::Removed,
    ];

    fn heading(self) -> &'static str {
        match self {
            ChangeType::Added => "Added",
            ChangeType::Changed => "Changed",
            ChangeType::Fixed => "Fixed",
            ChangeType::Removed => "Removed",
        }
    }
}

/// @ai:intent One commit from the log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Commit {
    pub hash: String,
    pub message: String,
    pub author: String,
    pub date: String,
}

/// @ai:intent Section for a commit message, first matching rule wins
/// @ai:effects pure
pub fn categorize(message: &str) -> Option<ChangeType> {
    let lower = message.to_lowercase();
    if lower.starts_with("feat:") || lower.contains("add") {
        Some(ChangeType::Added)
    } else if lower.starts_with("fix:") || lower.contains("fix") {
        Some(ChangeType::Fixed)
    } else if lower.starts_with("refactor:") || lower.contains("change") {
        Some(ChangeType::Changed)
    } else if lower.starts_with("remove:") || lower.contains("remove") {
        Some(ChangeType::Removed)
    } else {
        None
    }
}

/// @ai:intent Parse a `hash|subject|author|date` line; subjects may contain `|`
/// @ai:effects pure
pub fn parse_log_line(line: &str) -> Option<Commit> {
    let (hash, rest) = line.split_once('|')?;
    let (rest, date) = rest.rsplit_once('|')?;
    let (message, author) = rest.rsplit_once('|')?;
    Some(Commit {
        hash: hash.to_string(),
        message: message.to_string(),
        author: author.to_string(),
        date: date.to_string(),
    })
}

/// @ai:intent Render the changelog markdown for one release
/// @ai:effects pure
pub fn render_changelog(version: &str, date: NaiveDate, commits: &[Commit]) -> String {
    let mut md = String::new();
    md.push_str("# Changelog\n\n");
    md.push_str(&format!("## [{}] - {}\n\n", version, date.format("%Y-%m-%d")));

    for change_type in ChangeType::ALL {
        let entries: Vec<&Commit> = commits
            .iter()
            .filter(|c| categorize(&c.message) == Some(change_type))
            .collect();
        if entries.is_empty() {
            continue;
        }

        md.push_str(&format!("### {}\n\n", change_type.heading()));
        for commit in entries {
            md.push_str(&format!("- {} ({})\n", commit.message, commit.hash));
        }
        md.push('\n');
    }

    md
}

/// @ai:intent Write CHANGELOG.md from the git log and package version
/// @ai:effects io, fs:read, fs:write
pub fn generate_changelog(project: &Project, git: &dyn GitRepository, today: NaiveDate) -> Result<PathBuf> {
    let commits: Vec<Commit> = git.log()?.iter().filter_map(|l| parse_log_line(l)).collect();
    let version = package_version_string(&project.package_manifest())?;

    let path = project.changelog_path();
    std::fs::write(&path, render_changelog(&version, today, &commits))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::fixtures::project_with;

    struct LogOnly(Vec<String>);

    impl GitRepository for LogOnly {
        fn changed_files(&self) -> Result<Vec<String>> {
            Ok(vec![])
        }
        fn status_short(&self) -> Result<Vec<String>> {
            Ok(vec![])
        }
        fn show_head(&self, _path: &str) -> Result<Option<String>> {
            Ok(None)
        }
        fn files_at_head(&self, _dir: &str) -> Result<Vec<String>> {
            Ok(vec![])
        }
        fn log(&self) -> Result<Vec<String>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_categorize_precedence() {
        assert_eq!(categorize("feat: new rule"), Some(ChangeType::Added));
        assert_eq!(categorize("Fix padding and add tests"), Some(ChangeType::Added));
        assert_eq!(categorize("fix: false positive"), Some(ChangeType::Fixed));
        assert_eq!(categorize("refactor: helpers"), Some(ChangeType::Changed));
        assert_eq!(categorize("Remove dead rule"), Some(ChangeType::Removed));
        assert_eq!(categorize("chore: bump deps"), None);
    }

    #[test]
    fn test_parse_log_line_keeps_pipes_in_subject() {
        let commit = parse_log_line("abc123|fix: a | b|Jo Dev|2024-05-01").unwrap();
        assert_eq!(commit.hash, "abc123");
        assert_eq!(commit.message, "fix: a | b");
        assert_eq!(commit.author, "Jo Dev");
        assert_eq!(commit.date, "2024-05-01");
        assert_eq!(parse_log_line("garbage"), None);
    }

    #[test]
    fn test_generate_changelog() {
        let (dir, project) = project_with(&[("package.json", "{\"version\": \"2.3.4\"}")]);
        let git = LogOnly(vec![
            "a1|feat: NoAbbreviations rule|A|2024-01-02".into(),
            "b2|fix: crash on empty file|B|2024-01-03".into(),
            "c3|docs: readme|C|2024-01-04".into(),
        ]);

        let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let path = generate_changelog(&project, &git, today).unwrap();
        assert_eq!(path, dir.path().join("CHANGELOG.md"));
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "# Changelog\n\n## [2.3.4] - 2024-02-01\n\n### Added\n\n- feat: NoAbbreviations rule (a1)\n\n### Fixed\n\n- fix: crash on empty file (b2)\n\n"
        );
    }

    #[test]
    fn test_changelog_keeps_prerelease_version() {
        let (_dir, project) = project_with(&[("package.json", "{\"version\": \"2.0.0-beta.1\"}")]);
        let git = LogOnly(vec!["d4|feat: preview rule|D|2024-03-01".into()]);

        let today = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let path = generate_changelog(&project, &git, today).unwrap();
        assert!(std::fs::read_to_string(path)
            .unwrap()
            .contains("## [2.0.0-beta.1] - 2024-03-02"));
    }
}
