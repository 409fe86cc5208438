//! @ai:module:intent Semantic versions of rules and of the package manifest
//! @ai:module:layer domain
//! @ai:module:public_api SemVer, BumpKind, RuleVersion, find_rule_version, bump_package_version, package_version, package_version_string

use crate::error::{read_to_string, Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

static RULE_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"Version:\s*(\d+)\.(\d+)\.(\d+)").unwrap());

/// @ai:intent A major.minor.patch version
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemVer {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

/// @ai:intent Which component of a version to increment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BumpKind {
    Major,
    Minor,
    Patch,
}

impl SemVer {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch }
    }

    /// @ai:intent Increment one component, resetting the lower ones
    /// @ai:effects pure
    pub fn bump(self, kind: BumpKind) -> Self {
        match kind {
            BumpKind::Major => Self::new(self.major + 1, 0, 0),
            BumpKind::Minor => Self::new(self.major, self.minor + 1, 0),
            BumpKind::Patch => Self::new(self.major, self.minor, self.patch + 1),
        }
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SemVer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        let [major, minor, patch] = parts.as_slice() else {
            return Err(Error::InvalidVersion(s.to_string()));
        };
        let parse = |part: &str| {
            part.parse::<u64>()
                .map_err(|_| Error::InvalidVersion(s.to_string()))
        };
        Ok(Self::new(parse(*major)?, parse(*minor)?, parse(*patch)?))
    }
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumpKind::Major => write!(f, "major"),
            BumpKind::Minor => write!(f, "minor"),
            BumpKind::Patch => write!(f, "patch"),
        }
    }
}

impl FromStr for BumpKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "major" => Ok(BumpKind::Major),
            "minor" => Ok(BumpKind::Minor),
            "patch" => Ok(BumpKind::Patch),
            other => Err(Error::InvalidVersion(format!(
                "unknown bump type '{}', use major, minor or patch",
                other
            ))),
        }
    }
}

/// @ai:intent A `Version: x.y.z` occurrence in rule text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleVersion {
    pub version: SemVer,
    /// Exact matched text, e.g. `Version: 1.0.0`
    pub text: String,
}

/// @ai:intent First version marker in a rule file's text
/// @ai:effects pure
pub fn find_rule_version(text: &str) -> Option<RuleVersion> {
    let captures = RULE_VERSION.captures(text)?;
    let number = |i: usize| captures[i].parse::<u64>().ok();
    Some(RuleVersion {
        version: SemVer::new(number(1)?, number(2)?, number(3)?),
        text: captures[0].to_string(),
    })
}

/// @ai:intent Replace the first version marker with a new version
/// @ai:effects pure
pub fn replace_rule_version(text: &str, current: &RuleVersion, target: SemVer) -> String {
    text.replacen(&current.text, &format!("Version: {}", target), 1)
}

/// @ai:intent Raw version string of a package.json manifest, pre-release tags included
/// @ai:effects fs:read
pub fn package_version_string(manifest: &Path) -> Result<String> {
    let content = read_to_string(manifest)?;
    let json: serde_json::Value = serde_json::from_str(&content)?;
    json.get("version")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidVersion(format!("{} has no version field", manifest.display())))
}

/// @ai:intent Version field of a package.json manifest as a strict x.y.z version
/// @ai:effects fs:read
pub fn package_version(manifest: &Path) -> Result<SemVer> {
    package_version_string(manifest)?.parse()
}

/// @ai:intent Bump the manifest version, leaving the rest of the file untouched
/// @ai:effects fs:read, fs:write
pub fn bump_package_version(manifest: &Path, kind: BumpKind) -> Result<SemVer> {
    let content = read_to_string(manifest)?;
    let current = package_version(manifest)?;
    let json: serde_json::Value = serde_json::from_str(&content)?;
    let raw = json
        .get("version")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let next = current.bump(kind);
    let field = Regex::new(&format!(r#"("version"\s*:\s*"){}""#, regex::escape(&raw)))
        .map_err(|e| Error::InvalidVersion(e.to_string()))?;
    let updated = field.replace(&content, |caps: &regex::Captures| format!("{}{}\"", &caps[1], next));

    std::fs::write(manifest, updated.as_bytes())?;
    Ok(next)
}
