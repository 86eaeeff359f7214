// SPDX-License-Identifier: AGPL-3.0-or-later

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use chrono::{SecondsFormat, Utc};
use tracing::debug;

use crate::config_file::PublishConfig;
use crate::git::Git;
use crate::utils::files::{absolute_path, collect_files, copy_files};
use crate::utils::terminal::{confirm, print_title, print_variable, spinner};

/// Command line overrides for the publish settings of the config file.
#[derive(Debug, Default)]
pub struct PublishOptions {
    pub source: Option<PathBuf>,
    pub remote: Option<String>,
    pub branch: Option<String>,
    pub message: Option<String>,
    pub no_push: bool,
    pub yes: bool,
}

impl PublishOptions {
    fn apply(self, mut config: PublishConfig) -> PublishConfig {
        if let Some(source) = self.source {
            config.source = source;
        }
        if let Some(remote) = self.remote {
            config.remote = remote;
        }
        if let Some(branch) = self.branch {
            config.branch = branch;
        }
        if self.message.is_some() {
            config.message = self.message;
        }
        if self.no_push {
            config.push = false;
        }
        config
    }
}

/// Result of publishing the site.
#[derive(Debug, PartialEq)]
pub enum PublishOutcome {
    /// The branch already contains exactly these files.
    Unchanged,

    /// A new commit was created and, if enabled, pushed.
    Committed { files: usize, pushed: bool },
}

/// Publishes a pre-built static site to the hosting branch of a git remote.
pub async fn publish(config: PublishConfig, options: PublishOptions) -> Result<()> {
    let yes = options.yes;
    let config = options.apply(config);

    print_title("Publish documentation to hosting branch");
    print_variable("source", absolute_path(&config.source)?.display());
    print_variable("remote", &config.remote);
    print_variable("branch", &config.branch);
    print_variable("push", config.push);
    println!();

    if !confirm(
        &format!(
            "Do you want to publish '{}' to branch '{}'?",
            config.source.display(),
            config.branch
        ),
        yes,
    )? {
        println!("Abort. Nothing published.");
        return Ok(());
    }

    let progress = spinner("Publishing ..");
    let outcome = publish_site(&config, &env::current_dir()?).await;
    progress.finish_and_clear();

    match outcome? {
        PublishOutcome::Unchanged => {
            println!("Branch '{}' is already up-to-date. No changes to publish.", config.branch)
        }
        PublishOutcome::Committed { files, pushed: true } => println!(
            "Successfully published {files} files to '{}' on '{}'.",
            config.branch, config.remote
        ),
        PublishOutcome::Committed {
            files,
            pushed: false,
        } => println!(
            "Committed {files} files to '{}' without pushing.",
            config.branch
        ),
    }

    Ok(())
}

/// Commits the contents of the source directory onto the hosting branch.
///
/// The remote is cloned into a temporary working copy which gets removed afterwards. Remote
/// names are looked up in the git repository at `repo_dir`.
pub async fn publish_site(config: &PublishConfig, repo_dir: &Path) -> Result<PublishOutcome> {
    let source = repo_dir.join(&config.source);
    if !source.is_dir() {
        bail!("Source directory '{}' does not exist", source.display());
    }

    let files = collect_files(&source)?;
    if files.is_empty() {
        bail!("Source directory '{}' is empty", source.display());
    }

    let url = Git::new(repo_dir).resolve_remote(&config.remote).await?;
    debug!(%url, "resolved remote {}", config.remote);

    let cache = tempfile::tempdir()?;
    let git = Git::clone_repository(&url, &cache.path().join("site")).await?;

    let exists = git.remote_branch_exists(&config.branch).await?;
    git.checkout(&config.branch, exists).await?;
    git.remove_all().await?;

    copy_files(&source, git.work_dir(), &files)?;

    if !git.stage_all().await? {
        return Ok(PublishOutcome::Unchanged);
    }

    let message = match &config.message {
        Some(message) => message.clone(),
        None => format!(
            "Update {}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
        ),
    };
    git.commit(&message).await?;

    if config.push {
        git.push(&config.branch).await?;
    }

    Ok(PublishOutcome::Committed {
        files: files.len(),
        pushed: config.push,
    })
}
