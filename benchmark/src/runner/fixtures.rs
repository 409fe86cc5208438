//! @ai:module:intent Load the Apex sources rules are benchmarked against
//! @ai:module:layer infrastructure
//! @ai:module:public_api Fixture, discover_fixtures, total_kilobytes

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// @ai:intent One benchmark fixture and its content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub path: PathBuf,
    pub content: String,
    pub size: u64,
}

/// @ai:intent All `.cls` files directly in a directory, sorted by name
/// @ai:effects fs:read
pub fn discover_fixtures(dir: &Path) -> Result<Vec<Fixture>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "cls"))
        .collect();
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read fixture {}", path.display()))?;
            let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(content.len() as u64);
            Ok(Fixture { path, content, size })
        })
        .collect()
}

/// @ai:intent Combined size of the fixtures in KiB
/// @ai:effects pure
pub fn total_kilobytes(fixtures: &[Fixture]) -> f64 {
    fixtures.iter().map(|f| f.size).sum::<u64>() as f64 / 1024.0
}
