// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::Path;

use alloy::signers::local::PrivateKeySigner;
use anyhow::{bail, Context, Result};
use tracing::debug;

use crate::constants::PRIVATE_KEY_ENV_VAR;
use crate::utils::files;

/// Derives a signer from a hex-encoded secp256k1 private key string.
///
/// An optional `0x` prefix and surrounding whitespace are accepted.
pub fn parse_private_key(private_key_str: &str) -> Result<PrivateKeySigner> {
    let trimmed = private_key_str.trim();
    let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);

    let bytes = hex::decode(trimmed).with_context(|| "Private key is not valid hex")?;
    if bytes.len() != 32 {
        bail!("Private key needs to be 32 bytes, got {}", bytes.len());
    }

    let signer =
        PrivateKeySigner::from_slice(&bytes).with_context(|| "Invalid secp256k1 private key")?;
    Ok(signer)
}

/// Reads a hex-encoded private key string from a file and derives a signer from it.
///
/// The file is rejected when group or others can access it.
pub fn read_key_pair(path: &Path) -> Result<PrivateKeySigner> {
    #[cfg(unix)]
    {
        use std::os::unix::prelude::PermissionsExt;

        let mode = path.metadata()?.permissions().mode();
        if mode & 0o077 != 0 {
            bail!(
                "Private key file '{}' is accessible by others (mode {:o}), run `chmod 600` on it",
                path.display(),
                mode & 0o777
            );
        }
    }

    let private_key_str = files::read_file(path)?;
    parse_private_key(&private_key_str)
}

/// Loads the deployer key from the value of the environment variable or, if that is not set or
/// blank, from the given file.
pub fn load_key_pair(env_value: Option<&str>, path: &Path) -> Result<PrivateKeySigner> {
    match env_value {
        Some(private_key_str) if !private_key_str.trim().is_empty() => {
            debug!("using private key from {PRIVATE_KEY_ENV_VAR}");
            parse_private_key(private_key_str)
                .with_context(|| format!("Invalid private key in {PRIVATE_KEY_ENV_VAR}"))
        }
        _ => read_key_pair(path).with_context(|| {
            format!("Try reading private key file from path '{}'", path.display())
        }),
    }
}
