// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::utils::files;

/// Compiled contract ready for deployment: creation bytecode and, if known, its ABI.
///
/// Artifacts are either JSON files as emitted by solc, hardhat or foundry:
///
/// ```json
/// { "abi": [...], "bytecode": "0x6080..." }
/// ```
///
/// or plain text files containing nothing but the hex-encoded bytecode.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub bytecode: Vec<u8>,
    pub abi: Option<Value>,
}

impl Artifact {
    /// Loads an artifact from a file, `.json` files are parsed as JSON artifacts.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = files::read_file(path)
            .with_context(|| format!("Try reading artifact from path '{}'", path.display()))?;

        let artifact = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&data),
            _ => Self::from_hex(&data),
        };

        artifact.with_context(|| format!("Invalid contract artifact '{}'", path.display()))
    }

    /// Parses a JSON artifact with `abi` and `bytecode` fields.
    pub fn from_json(data: &str) -> Result<Self> {
        let artifact: JsonArtifact =
            serde_json::from_str(data).with_context(|| "Invalid JSON syntax in artifact")?;

        let bytecode = match artifact.bytecode {
            BytecodeField::Hex(hex) => hex,
            BytecodeField::Object { object } => object,
        };

        Ok(Self {
            bytecode: decode_bytecode(&bytecode)?,
            abi: artifact.abi,
        })
    }

    /// Parses hex-encoded bytecode without any ABI.
    pub fn from_hex(data: &str) -> Result<Self> {
        Ok(Self {
            bytecode: decode_bytecode(data)?,
            abi: None,
        })
    }

    /// Returns the number of arguments the constructor expects according to the ABI.
    pub fn constructor_inputs(&self) -> usize {
        let Some(Value::Array(items)) = &self.abi else {
            return 0;
        };

        items
            .iter()
            .find(|item| item.get("type").and_then(Value::as_str) == Some("constructor"))
            .and_then(|constructor| constructor.get("inputs"))
            .and_then(Value::as_array)
            .map(|inputs| inputs.len())
            .unwrap_or(0)
    }

    /// Makes sure the bytecode can be deployed as-is.
    ///
    /// Encoding constructor arguments is not supported, contracts requiring them are rejected.
    pub fn ensure_deployable(&self) -> Result<()> {
        let inputs = self.constructor_inputs();
        if inputs > 0 {
            bail!("Constructor expects {inputs} argument(s) which can not be passed on deployment");
        }

        Ok(())
    }
}

#[derive(Deserialize)]
struct JsonArtifact {
    #[serde(default)]
    abi: Option<Value>,
    bytecode: BytecodeField,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BytecodeField {
    Hex(String),
    Object { object: String },
}

fn decode_bytecode(data: &str) -> Result<Vec<u8>> {
    let trimmed = data.trim();
    let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);

    if trimmed.is_empty() {
        bail!("Bytecode is empty");
    }

    hex::decode(trimmed).with_context(|| "Bytecode is not valid hex")
}
