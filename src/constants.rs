// SPDX-License-Identifier: AGPL-3.0-or-later

pub const CONFIG_FILE_NAME: &str = "ferrum.toml";
pub const PRIVATE_KEY_FILE_NAME: &str = "secret.txt";

/// Environment variable which takes precedence over the private key file.
pub const PRIVATE_KEY_ENV_VAR: &str = "FERRUM_DEPLOYER_KEY";

pub const DEFAULT_SOURCE_DIR: &str = "docs";
pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_BRANCH: &str = "gh-pages";

pub const DEFAULT_ENDPOINT: &str = "http://localhost:9933";
pub const DEFAULT_GAS_LIMIT: u64 = 4_294_967;
