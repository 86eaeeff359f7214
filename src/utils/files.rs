// SPDX-License-Identifier: AGPL-3.0-or-later

use std::env;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use path_clean::PathClean;
use tracing::warn;

/// Returns the absolute path of a file or directory.
pub fn absolute_path(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();

    let absolute_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()?.join(path)
    }
    .clean();

    Ok(absolute_path)
}

/// Helper method to write a string to a file.
pub fn write_file(path: impl AsRef<Path>, content: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Helper method to read a string from a file.
pub fn read_file(path: impl AsRef<Path>) -> Result<String> {
    let mut buf = String::new();
    let mut file = File::open(path)?;
    file.read_to_string(&mut buf)?;
    Ok(buf)
}

/// Returns true for names starting with a dot, like `.git` or `.nojekyll`.
fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Collects all regular files below `root` as paths relative to it, sorted.
///
/// Hidden files and directories are skipped, matching what a `**/*` glob would pick up. Symlinks
/// to files are collected (and later copied as regular files), symlinks to directories are
/// skipped so the walk never runs in circles.
pub fn collect_files(root: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries =
            fs::read_dir(&dir).with_context(|| format!("Could not read '{}'", dir.display()))?;

        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if is_hidden(&path) {
                continue;
            }

            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
                files.push(path.strip_prefix(root)?.to_path_buf());
            } else {
                warn!("skipping '{}'", path.display());
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Copies the given relative file paths from `source` into `target`, creating directories on the
/// way.
pub fn copy_files(source: &Path, target: &Path, files: &[PathBuf]) -> Result<()> {
    for file in files {
        let to = target.join(file);
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::copy(source.join(file), &to)
            .with_context(|| format!("Could not copy '{}'", file.display()))?;
    }

    Ok(())
}
