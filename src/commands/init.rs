// SPDX-License-Identifier: AGPL-3.0-or-later

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::constants::CONFIG_FILE_NAME;
use crate::utils::files::{self, absolute_path};
use crate::utils::terminal::{print_title, print_variable};

const CONFIG_TEMPLATE: &str = r#"# Publishes the pre-built documentation to the hosting branch.
[publish]
# Directory holding the static site.
source = "docs"
# Git remote name or URL.
remote = "origin"
branch = "gh-pages"
# message = "Update documentation"
push = true

# Deploys the base contracts in the listed order.
#
# The private key is read from FERRUM_DEPLOYER_KEY or from the key file
# given with `--key` (defaults to secret.txt, needs mode 0600).
[deploy]
endpoint = "http://localhost:9933"
# Deployment is refused when the key does not belong to this account.
# account = "0x..."
gas_limit = 4294967
legacy = true

[[deploy.contracts]]
name = "poc"
artifact = "contracts/poc.json"

[[deploy.contracts]]
name = "ledger-manager"
artifact = "contracts/ledger_manager.json"
"#;

/// Initialises a config file with default values in a given folder.
pub fn init(target_dir: Option<PathBuf>) -> Result<()> {
    // Use current directory when none was given
    let target_dir = match target_dir {
        Some(dir) => dir,
        None => env::current_dir()?,
    };
    let path = target_dir.join(CONFIG_FILE_NAME);

    print_title("Initialise a new config file");
    print_variable("path", absolute_path(&path)?.display());
    println!();

    if path.exists() {
        bail!("Config file already exists at '{}'", path.display());
    }

    fs::create_dir_all(&target_dir)
        .with_context(|| format!("Could not create folder '{}'", target_dir.display()))?;
    files::write_file(&path, CONFIG_TEMPLATE)?;

    println!("Created {CONFIG_FILE_NAME}, adjust it and run `publish` or `deploy`.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::config_file::ConfigFile;

    use super::{init, CONFIG_TEMPLATE};

    #[test]
    fn template_matches_defaults() {
        let config: ConfigFile = toml::from_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn does_not_overwrite_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("project");

        init(Some(target.clone())).unwrap();
        assert!(ConfigFile::from_path(target.join("ferrum.toml")).is_ok());
        assert!(init(Some(target)).is_err());
    }
}
