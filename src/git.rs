// SPDX-License-Identifier: AGPL-3.0-or-later

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tokio::process::Command;
use tracing::debug;

use crate::utils::files::absolute_path;

/// Runs `git` commands inside a working directory.
#[derive(Debug)]
pub struct Git {
    work_dir: PathBuf,
}

impl Git {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Runs git with the given arguments and returns its trimmed stdout.
    pub async fn run<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<S> = args.into_iter().collect();
        let printable = args
            .iter()
            .map(|arg| arg.as_ref().to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");
        debug!(work_dir = %self.work_dir.display(), "git {printable}");

        let output = Command::new("git")
            .args(&args)
            .current_dir(&self.work_dir)
            .output()
            .await
            .with_context(|| "Could not run git, is it installed?")?;

        if !output.status.success() {
            bail!(
                "`git {printable}` failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Returns the URL of a remote, or the value itself when it already looks like a URL or path.
    ///
    /// Relative paths to existing repositories are made absolute against the working directory,
    /// so they can be cloned from anywhere.
    pub async fn resolve_remote(&self, remote: &str) -> Result<String> {
        let url = if remote.contains('/') || remote.contains(':') {
            remote.to_string()
        } else {
            self.run(["remote", "get-url", remote])
                .await
                .with_context(|| format!("Unknown git remote '{remote}'"))?
        };

        let local = Path::new(&url);
        if local.is_relative() && self.work_dir.join(local).exists() {
            let absolute = absolute_path(self.work_dir.join(local))?;
            return Ok(absolute.display().to_string());
        }

        Ok(url)
    }

    /// Clones `url` into `target` and returns a handle on the new working copy.
    pub async fn clone_repository(url: &str, target: &Path) -> Result<Self> {
        let parent = target
            .parent()
            .with_context(|| format!("Invalid clone target '{}'", target.display()))?;

        Git::new(parent)
            .run([
                OsStr::new("clone"),
                OsStr::new("--quiet"),
                OsStr::new(url),
                target.as_os_str(),
            ])
            .await?;

        Ok(Git::new(target))
    }

    /// Returns true when `branch` exists on the remote `origin`.
    pub async fn remote_branch_exists(&self, branch: &str) -> Result<bool> {
        let heads = self.run(["ls-remote", "--heads", "origin", branch]).await?;
        Ok(!heads.is_empty())
    }

    /// Checks out `branch`, starting a new history for it when it does not exist yet.
    pub async fn checkout(&self, branch: &str, exists: bool) -> Result<()> {
        if exists {
            self.run(["checkout", "--quiet", branch]).await?;
        } else {
            self.run(["checkout", "--quiet", "--orphan", branch]).await?;
        }

        Ok(())
    }

    /// Removes all tracked files from the index and the working copy.
    pub async fn remove_all(&self) -> Result<()> {
        self.run(["rm", "-r", "-f", "--quiet", "--ignore-unmatch", "."]).await?;
        Ok(())
    }

    /// Stages everything and returns true when there is anything to commit.
    pub async fn stage_all(&self) -> Result<bool> {
        self.run(["add", "--all", "."]).await?;
        let status = self.run(["status", "--porcelain"]).await?;
        Ok(!status.is_empty())
    }

    pub async fn commit(&self, message: &str) -> Result<()> {
        self.run(["commit", "--quiet", "-m", message]).await?;
        Ok(())
    }

    pub async fn push(&self, branch: &str) -> Result<()> {
        self.run(["push", "--quiet", "origin", branch]).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Git;

    #[tokio::test]
    async fn urls_and_paths_are_not_resolved() {
        let git = Git::new(".");

        assert_eq!(
            git.resolve_remote("git@github.com:ferrum/docs.git").await.unwrap(),
            "git@github.com:ferrum/docs.git"
        );
        assert_eq!(
            git.resolve_remote("/srv/git/docs.git").await.unwrap(),
            "/srv/git/docs.git"
        );
    }

    #[tokio::test]
    async fn relative_paths_become_absolute() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("remote.git")).unwrap();

        let url = Git::new(dir.path())
            .resolve_remote("./remote.git")
            .await
            .unwrap();
        assert_eq!(url, dir.path().join("remote.git").display().to_string());

        // Paths which do not exist are passed on as they are
        let url = Git::new(dir.path())
            .resolve_remote("../missing.git")
            .await
            .unwrap();
        assert_eq!(url, "../missing.git");
    }

    #[tokio::test]
    async fn unknown_remote_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Git::new(dir.path()).resolve_remote("origin").await.is_err());
    }
}
