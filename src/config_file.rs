// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_BRANCH, DEFAULT_ENDPOINT, DEFAULT_GAS_LIMIT, DEFAULT_REMOTE,
    DEFAULT_SOURCE_DIR,
};
use crate::utils::files;

/// Serializable format configuring the publish and deploy commands.
///
/// Every value is optional and falls back to its default.
///
/// ```toml
/// [publish]
/// source = "docs"
/// remote = "origin"
/// branch = "gh-pages"
///
/// [deploy]
/// endpoint = "http://localhost:9933"
/// gas_limit = 4294967
///
/// [[deploy.contracts]]
/// name = "poc"
/// artifact = "contracts/poc.json"
///
/// [[deploy.contracts]]
/// name = "ledger-manager"
/// artifact = "contracts/ledger_manager.json"
/// ```
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub publish: PublishConfig,
    pub deploy: DeployConfig,
}

impl ConfigFile {
    /// Loads a .toml file from the given path and serialises its content into a new `ConfigFile`
    /// instance.
    ///
    /// Relative paths inside the file are resolved against the folder the file lives in.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let data = files::read_file(&path)?;
        let mut config_file: Self =
            toml::from_str(&data).with_context(|| "Invalid TOML syntax in config file")?;

        if let Some(base) = path.as_ref().parent() {
            config_file.resolve_paths(base);
        }

        Ok(config_file)
    }

    fn resolve_paths(&mut self, base: &Path) {
        if base.as_os_str().is_empty() {
            return;
        }

        self.publish.source = base.join(&self.publish.source);
        for contract in self.deploy.contracts.iter_mut() {
            contract.artifact = base.join(&contract.artifact);
        }
    }

    /// Loads the config file from an explicitly given path or the default one.
    ///
    /// Only a missing file at the default path falls back to default values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_path(path).with_context(|| {
                format!("Try reading config file from path '{}'", path.display())
            }),
            None if Path::new(CONFIG_FILE_NAME).exists() => Self::from_path(CONFIG_FILE_NAME),
            None => Ok(Self::default()),
        }
    }
}

/// Where the static site comes from and where it gets published to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    /// Directory holding the pre-built static site.
    pub source: PathBuf,

    /// Name of a git remote of the current repository or a cloneable URL.
    pub remote: String,

    /// Branch the site gets committed to.
    pub branch: String,

    /// Commit message, defaults to a timestamped one.
    pub message: Option<String>,

    /// Push the branch after committing.
    pub push: bool,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from(DEFAULT_SOURCE_DIR),
            remote: DEFAULT_REMOTE.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            message: None,
            push: true,
        }
    }
}

/// Node connection and contracts to deploy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    /// JSON-RPC endpoint of the node.
    pub endpoint: String,

    /// Expected deployer address. When set it has to match the address of the private key.
    pub account: Option<String>,

    /// Gas limit of every contract creation transaction.
    pub gas_limit: u64,

    /// Send legacy transactions with a gas price fetched from the node.
    pub legacy: bool,

    /// Contracts in the order they get deployed.
    pub contracts: Vec<ContractConfig>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            account: None,
            gas_limit: DEFAULT_GAS_LIMIT,
            legacy: true,
            contracts: vec![
                ContractConfig::new("poc", "contracts/poc.json"),
                ContractConfig::new("ledger-manager", "contracts/ledger_manager.json"),
            ],
        }
    }
}

/// Single contract with the path to its compiled artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractConfig {
    pub name: String,
    pub artifact: PathBuf,
}

impl ContractConfig {
    pub fn new(name: &str, artifact: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            artifact: artifact.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::{ConfigFile, ContractConfig};

    #[test]
    fn empty_file_uses_defaults() {
        let config: ConfigFile = toml::from_str("").unwrap();

        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.publish.source, PathBuf::from("docs"));
        assert_eq!(config.publish.branch, "gh-pages");
        assert_eq!(config.deploy.endpoint, "http://localhost:9933");
        assert_eq!(config.deploy.gas_limit, 4_294_967);

        let names: Vec<&str> = config
            .deploy
            .contracts
            .iter()
            .map(|contract| contract.name.as_str())
            .collect();
        assert_eq!(names, vec!["poc", "ledger-manager"]);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config: ConfigFile = toml::from_str(
            r#"
            [publish]
            branch = "pages"
            push = false

            [deploy]
            endpoint = "http://node:9933"

            [[deploy.contracts]]
            name = "token"
            artifact = "out/token.bin"
            "#,
        )
        .unwrap();

        assert_eq!(config.publish.branch, "pages");
        assert!(!config.publish.push);
        assert_eq!(config.publish.remote, "origin");
        assert_eq!(config.deploy.endpoint, "http://node:9933");
        assert!(config.deploy.legacy);
        assert_eq!(
            config.deploy.contracts,
            vec![ContractConfig::new("token", "out/token.bin")]
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(toml::from_str::<ConfigFile>("[publish]\nbrnach = \"x\"").is_err());
        assert!(toml::from_str::<ConfigFile>("[deploy]\nprivate_key = \"x\"").is_err());
    }

    #[test]
    fn paths_are_relative_to_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("deployment");
        fs::create_dir(&base).unwrap();

        let path = base.join("ferrum.toml");
        fs::write(
            &path,
            r#"
            [publish]
            source = "_book"

            [[deploy.contracts]]
            name = "poc"
            artifact = "out/poc.bin"

            [[deploy.contracts]]
            name = "ledger-manager"
            artifact = "/opt/contracts/ledger_manager.json"
            "#,
        )
        .unwrap();

        let config = ConfigFile::from_path(&path).unwrap();
        assert_eq!(config.publish.source, base.join("_book"));
        assert_eq!(config.deploy.contracts[0].artifact, base.join("out/poc.bin"));
        assert_eq!(
            config.deploy.contracts[1].artifact,
            PathBuf::from("/opt/contracts/ledger_manager.json")
        );
    }

    #[test]
    fn file_in_current_folder_keeps_relative_paths() {
        let mut config = ConfigFile::default();
        config.resolve_paths(std::path::Path::new(""));
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn explicit_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ferrum.toml");
        assert!(ConfigFile::load(Some(&path)).is_err());

        fs::write(&path, "[deploy]\ngas_limit = 21000\n").unwrap();
        let config = ConfigFile::load(Some(&path)).unwrap();
        assert_eq!(config.deploy.gas_limit, 21000);
    }
}
