//! @ai:module:intent Read-only access to the git metadata of a rule repository
//! @ai:module:layer infrastructure
//! @ai:module:public_api GitRepository, CommandGit
//! @ai:module:depends_on error

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// @ai:intent Git queries needed by version bumping and changelog generation
pub trait GitRepository: Send + Sync {
    /// Paths changed in the working tree relative to HEAD (`git diff --name-only HEAD`)
    fn changed_files(&self) -> Result<Vec<String>>;

    /// Raw `git status --short` lines, leading status columns preserved
    fn status_short(&self) -> Result<Vec<String>>;

    /// Content of a path at HEAD, `None` when it does not exist there
    fn show_head(&self, path: &str) -> Result<Option<String>>;

    /// Files tracked at HEAD below a directory
    fn files_at_head(&self, dir: &str) -> Result<Vec<String>>;

    /// Commit log lines formatted as `hash|subject|author|date`
    fn log(&self) -> Result<Vec<String>>;
}

/// @ai:intent GitRepository backed by the git command line
#[derive(Debug, Clone)]
pub struct CommandGit {
    root: PathBuf,
}

impl CommandGit {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// @ai:intent Run git with arguments, returning stdout on success
    /// @ai:effects io
    fn run(&self, args: &[&str]) -> Result<String> {
        debug!("git {}", args.join(" "));
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|e| Error::Git {
                command: args.join(" "),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(Error::Git {
                command: args.join(" "),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn non_empty_lines(output: &str) -> Vec<String> {
    output
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

impl GitRepository for CommandGit {
    fn changed_files(&self) -> Result<Vec<String>> {
        Ok(non_empty_lines(&self.run(&["diff", "--name-only", "HEAD"])?))
    }

    fn status_short(&self) -> Result<Vec<String>> {
        Ok(non_empty_lines(&self.run(&["status", "--short"])?))
    }

    fn show_head(&self, path: &str) -> Result<Option<String>> {
        match self.run(&["show", &format!("HEAD:{}", path)]) {
            Ok(content) => Ok(Some(content)),
            Err(Error::Git { message, .. }) => {
                debug!("{} not available at HEAD: {}", path, message);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn files_at_head(&self, dir: &str) -> Result<Vec<String>> {
        Ok(non_empty_lines(&self.run(&["ls-tree", "-r", "--name-only", "HEAD", dir])?))
    }

    fn log(&self) -> Result<Vec<String>> {
        Ok(non_empty_lines(&self.run(&[
            "log",
            "--pretty=format:%h|%s|%an|%ad",
            "--date=short",
        ])?))
    }
}
