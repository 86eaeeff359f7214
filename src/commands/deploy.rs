// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::PathBuf;

use alloy::primitives::Address;
use anyhow::{bail, Context, Result};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use console::style;
use tracing::info;

use crate::artifact::Artifact;
use crate::config_file::{ContractConfig, DeployConfig};
use crate::deployer::{ContractDeployer, NodeDeployer, Receipt};
use crate::utils::files::absolute_path;
use crate::utils::key_pair;
use crate::utils::terminal::{confirm, print_title, print_variable, spinner};

/// Command line overrides for the deploy settings of the config file.
pub struct DeployOptions {
    pub endpoint: Option<String>,
    /// Value of the private key environment variable, takes precedence over the key file.
    pub private_key: Option<String>,
    pub private_key_path: PathBuf,
    pub dry_run: bool,
    pub yes: bool,
}

/// Contract with its loaded artifact, ready to be deployed.
#[derive(Debug, Clone)]
pub struct PlannedContract {
    pub name: String,
    pub artifact_path: PathBuf,
    pub artifact: Artifact,
}

/// Contract which got deployed on the node.
#[derive(Debug, Clone)]
pub struct DeployedContract {
    pub name: String,
    pub receipt: Receipt,
}

/// Deploy the configured contracts on a node, one after another.
pub async fn deploy(mut config: DeployConfig, options: DeployOptions) -> Result<()> {
    if let Some(endpoint) = options.endpoint {
        config.endpoint = endpoint;
    }

    print_title("Deploy base contracts on a node");
    print_variable("endpoint", &config.endpoint);
    print_variable(
        "private_key_path",
        absolute_path(&options.private_key_path)?.display(),
    );
    print_variable("gas_limit", config.gas_limit);
    println!();

    let signer =
        key_pair::load_key_pair(options.private_key.as_deref(), &options.private_key_path)?;
    check_account(config.account.as_deref(), signer.address())?;

    let plan = load_plan(&config.contracts)?;
    print_plan(&plan, signer.address());

    if options.dry_run {
        return Ok(());
    }

    if !confirm(
        &format!("Do you want to deploy these contracts ({} total)?", plan.len()),
        options.yes,
    )? {
        println!("Abort. No contracts deployed.");
        return Ok(());
    }

    let deployer =
        NodeDeployer::connect(&config.endpoint, signer, config.gas_limit, config.legacy).await?;
    let chain_id = deployer.chain_id().await?;
    info!(chain_id, "connected to {}", config.endpoint);

    let deployed = execute_plan(&deployer, &plan).await?;
    print_receipts(&deployed);

    Ok(())
}

/// Fails when an expected account is configured and the key belongs to another one.
pub fn check_account(expected: Option<&str>, actual: Address) -> Result<()> {
    let Some(expected) = expected else {
        return Ok(());
    };

    let expected: Address = expected
        .parse()
        .with_context(|| format!("Invalid account address '{expected}' in config file"))?;

    if expected != actual {
        bail!("Private key belongs to {actual} but config expects account {expected}");
    }

    Ok(())
}

/// Loads and validates the artifacts of all contracts before anything gets deployed.
pub fn load_plan(contracts: &[ContractConfig]) -> Result<Vec<PlannedContract>> {
    if contracts.is_empty() {
        bail!("No contracts given to deploy. Please add them to the config file.");
    }

    contracts
        .iter()
        .map(|contract| {
            let artifact = Artifact::from_path(&contract.artifact)?;
            artifact
                .ensure_deployable()
                .with_context(|| format!("Can not deploy contract '{}'", contract.name))?;

            Ok(PlannedContract {
                name: contract.name.clone(),
                artifact_path: contract.artifact.clone(),
                artifact,
            })
        })
        .collect()
}

/// Deploys every planned contract in order, waiting for each one before starting the next.
///
/// Stops at the first failure. Contracts deployed until then stay deployed.
pub async fn execute_plan(
    deployer: &impl ContractDeployer,
    plan: &[PlannedContract],
) -> Result<Vec<DeployedContract>> {
    let mut deployed: Vec<DeployedContract> = Vec::new();

    for contract in plan {
        let progress = spinner(format!("Deploying {} ..", contract.name));
        let result = deployer
            .deploy(&contract.name, &contract.artifact.bytecode)
            .await;
        progress.finish_and_clear();

        let receipt = match result {
            Ok(receipt) => receipt,
            Err(err) if deployed.is_empty() => {
                return Err(err.context(format!("Could not deploy contract '{}'", contract.name)))
            }
            Err(err) => {
                let names: Vec<&str> = deployed.iter().map(|item| item.name.as_str()).collect();
                return Err(err.context(format!(
                    "Could not deploy contract '{}' (already deployed: {})",
                    contract.name,
                    names.join(", ")
                )));
            }
        };

        println!(
            "Contract {} deployed at address {}",
            style(&contract.name).bold(),
            style(receipt.contract_address).green()
        );

        deployed.push(DeployedContract {
            name: contract.name.clone(),
            receipt,
        });
    }

    Ok(deployed)
}

/// Shows which contracts are about to be deployed from which account.
fn print_plan(plan: &[PlannedContract], account: Address) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["#", "Contract", "Artifact", "Bytecode Size"]);

    for (index, contract) in plan.iter().enumerate() {
        table.add_row(vec![
            (index + 1).to_string(),
            contract.name.clone(),
            contract.artifact_path.display().to_string(),
            format!("{} bytes", contract.artifact.bytecode.len()),
        ]);
    }

    println!("{table}\n");
    println!("Attempting to deploy from account: {}\n", style(account).bold());
}

fn print_receipts(deployed: &[DeployedContract]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Contract", "Address", "Transaction", "Gas Used"]);

    for contract in deployed {
        table.add_row(vec![
            contract.name.clone(),
            contract.receipt.contract_address.to_string(),
            contract.receipt.transaction_hash.to_string(),
            contract.receipt.gas_used.to_string(),
        ]);
    }

    println!("\n{table}");
    println!("Successfully deployed {} contracts.", deployed.len());
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Mutex;

    use alloy::primitives::{address, Address, TxHash};
    use anyhow::{bail, Result};
    use async_trait::async_trait;

    use crate::artifact::Artifact;
    use crate::config_file::ContractConfig;
    use crate::deployer::{ContractDeployer, Receipt};

    use super::{check_account, execute_plan, load_plan, PlannedContract};

    /// Records every call and fails for one contract name if asked to.
    #[derive(Default)]
    struct RecordingDeployer {
        calls: Mutex<Vec<(String, Vec<u8>)>>,
        fail_on: Option<String>,
    }

    #[async_trait]
    impl ContractDeployer for RecordingDeployer {
        async fn deploy(&self, name: &str, bytecode: &[u8]) -> Result<Receipt> {
            let mut calls = self.calls.lock().unwrap();
            calls.push((name.to_string(), bytecode.to_vec()));

            if self.fail_on.as_deref() == Some(name) {
                bail!("out of gas");
            }

            Ok(Receipt {
                contract_address: Address::with_last_byte(calls.len() as u8),
                transaction_hash: TxHash::with_last_byte(calls.len() as u8),
                gas_used: 21_000,
            })
        }
    }

    fn planned(name: &str, bytecode: &[u8]) -> PlannedContract {
        PlannedContract {
            name: name.to_string(),
            artifact_path: format!("{name}.bin").into(),
            artifact: Artifact {
                bytecode: bytecode.to_vec(),
                abi: None,
            },
        }
    }

    #[tokio::test]
    async fn deploys_each_contract_once_in_order() {
        let deployer = RecordingDeployer::default();
        let plan = vec![planned("poc", &[0x01]), planned("ledger-manager", &[0x02])];

        let deployed = execute_plan(&deployer, &plan).await.unwrap();

        assert_eq!(
            *deployer.calls.lock().unwrap(),
            vec![
                ("poc".to_string(), vec![0x01]),
                ("ledger-manager".to_string(), vec![0x02]),
            ]
        );
        assert_eq!(deployed.len(), 2);
        assert_eq!(deployed[0].name, "poc");
        assert_eq!(deployed[0].receipt.contract_address, Address::with_last_byte(1));
        assert_eq!(deployed[1].receipt.contract_address, Address::with_last_byte(2));
    }

    #[tokio::test]
    async fn stops_at_first_failure() {
        let deployer = RecordingDeployer {
            fail_on: Some("ledger-manager".into()),
            ..Default::default()
        };
        let plan = vec![
            planned("poc", &[0x01]),
            planned("ledger-manager", &[0x02]),
            planned("bridge", &[0x03]),
        ];

        let err = execute_plan(&deployer, &plan).await.unwrap_err();

        assert_eq!(deployer.calls.lock().unwrap().len(), 2);
        assert!(format!("{err:#}").contains("already deployed: poc"));
        assert!(format!("{err:#}").contains("out of gas"));
    }

    #[test]
    fn plan_keeps_configured_order() {
        let dir = tempfile::tempdir().unwrap();
        let poc = dir.path().join("poc.bin");
        let ledger = dir.path().join("ledger_manager.json");
        fs::write(&poc, "0x6080").unwrap();
        fs::write(&ledger, r#"{ "abi": [], "bytecode": "0x6040" }"#).unwrap();

        let plan = load_plan(&[
            ContractConfig::new("poc", &poc),
            ContractConfig::new("ledger-manager", &ledger),
        ])
        .unwrap();

        let names: Vec<&str> = plan.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, vec!["poc", "ledger-manager"]);
        assert_eq!(plan[1].artifact.bytecode, vec![0x60, 0x40]);
    }

    #[test]
    fn plan_fails_before_deploying_anything() {
        let dir = tempfile::tempdir().unwrap();
        let poc = dir.path().join("poc.bin");
        fs::write(&poc, "0x6080").unwrap();

        assert!(load_plan(&[]).is_err());
        assert!(load_plan(&[
            ContractConfig::new("poc", &poc),
            ContractConfig::new("ledger-manager", dir.path().join("missing.json")),
        ])
        .is_err());
    }

    #[test]
    fn account_has_to_match_key() {
        let actual = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

        assert!(check_account(None, actual).is_ok());
        assert!(check_account(Some("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"), actual).is_ok());
        assert!(check_account(Some("0x6Be02d1d3665660d22FF9624b7BE0551ee1Ac91b"), actual).is_err());
        assert!(check_account(Some("not an address"), actual).is_err());
    }
}
