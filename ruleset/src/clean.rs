//! @ai:module:intent Remove generated AST dumps and override rulesets
//! @ai:module:layer application
//! @ai:module:public_api find_generated_files, clean, GENERATED_SUFFIXES

use crate::error::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File name endings of generated artifacts
pub const GENERATED_SUFFIXES: [&str; 2] = [".ast.xml", ".override.xml"];

const SKIPPED_DIRS: [&str; 3] = [".git", "node_modules", "target"];

/// @ai:intent Find generated files below the root, sorted by path
/// @ai:effects fs:read
pub fn find_generated_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !(entry.file_type().is_dir()
                    && SKIPPED_DIRS
                        .iter()
                        .any(|skipped| entry.file_name() == *skipped))
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy();
            GENERATED_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
        })
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

/// @ai:intent Delete generated files, returning their paths relative to the root
/// @ai:effects fs:write
pub fn clean(root: &Path) -> Result<Vec<PathBuf>> {
    let files = find_generated_files(root);
    let mut removed = Vec::with_capacity(files.len());

    for file in files {
        std::fs::remove_file(&file)?;
        removed.push(file.strip_prefix(root).unwrap_or(&file).to_path_buf());
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, path: &str) {
        let full = root.join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, "").unwrap();
    }

    #[test]
    fn test_finds_generated_files_only() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "tests/Foo.ast.xml");
        touch(dir.path(), "rulesets/naming/Rule.override.xml");
        touch(dir.path(), "rulesets/naming/Rule.xml");
        touch(dir.path(), "node_modules/pkg/Dep.ast.xml");

        let files = find_generated_files(dir.path());
        assert_eq!(
            files,
            vec![
                dir.path().join("rulesets/naming/Rule.override.xml"),
                dir.path().join("tests/Foo.ast.xml"),
            ]
        );
    }

    #[test]
    fn test_clean_removes_and_reports_relative_paths() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "out/A.ast.xml");
        touch(dir.path(), "keep.xml");

        let removed = clean(dir.path()).unwrap();
        assert_eq!(removed, vec![PathBuf::from("out/A.ast.xml")]);
        assert!(!dir.path().join("out/A.ast.xml").exists());
        assert!(dir.path().join("keep.xml").exists());

        assert!(clean(dir.path()).unwrap().is_empty());
    }
}
