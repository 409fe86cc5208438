//! @ai:module:intent Define error types for the rule tooling
//! @ai:module:layer domain
//! @ai:module:public_api Error, Result
//! @ai:module:stateless true

use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Unified error type for all rule tooling operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("XML parse error at byte {position}: {message}")]
    XmlParse { position: usize, message: String },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to write configuration: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("Invalid regex for rule {rule}: {message}")]
    InvalidRegex { rule: String, message: String },

    #[error("PMD CLI not available. Please install PMD to run tests.")]
    PmdUnavailable,

    #[error("PMD did not finish within {0} seconds")]
    PmdTimeout(u64),

    #[error("Error running PMD: {0}")]
    Pmd(String),

    #[error("git {command} failed: {message}")]
    Git { command: String, message: String },

    #[error("{0}")]
    Assertion(String),

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Fixture file not found: {0}")]
    FixtureNotFound(PathBuf),

    #[error("Invalid results path (outside project root): {0}")]
    PathOutsideRoot(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;

/// @ai:intent Read a file to string, attaching the path to failures
/// @ai:effects fs:read
pub fn read_to_string(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })
}
