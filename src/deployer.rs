// SPDX-License-Identifier: AGPL-3.0-or-later

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use tracing::debug;

/// Outcome of a successful contract creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub contract_address: Address,
    pub transaction_hash: TxHash,
    pub gas_used: u64,
}

/// Submits contract creation transactions and waits for them to be included.
#[async_trait]
pub trait ContractDeployer: Send + Sync {
    async fn deploy(&self, name: &str, bytecode: &[u8]) -> Result<Receipt>;
}

/// Deploys contracts on a node via JSON-RPC, signing every transaction locally.
pub struct NodeDeployer {
    provider: DynProvider,
    gas_limit: u64,
    legacy: bool,
}

impl NodeDeployer {
    /// Connects to the node's HTTP endpoint. Nonce and chain id of every transaction are filled
    /// in by asking the node.
    pub async fn connect(
        endpoint: &str,
        signer: PrivateKeySigner,
        gas_limit: u64,
        legacy: bool,
    ) -> Result<Self> {
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect(endpoint)
            .await
            .with_context(|| format!("Could not connect to node at '{endpoint}'"))?
            .erased();

        Ok(Self {
            provider,
            gas_limit,
            legacy,
        })
    }

    pub async fn chain_id(&self) -> Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|err| anyhow!("JSON-RPC request to node failed: {err}"))
    }
}

#[async_trait]
impl ContractDeployer for NodeDeployer {
    async fn deploy(&self, name: &str, bytecode: &[u8]) -> Result<Receipt> {
        let mut transaction = TransactionRequest::default()
            .with_deploy_code(Bytes::copy_from_slice(bytecode))
            .with_gas_limit(self.gas_limit);

        if self.legacy {
            let gas_price = self
                .provider
                .get_gas_price()
                .await
                .map_err(|err| anyhow!("JSON-RPC request to node failed: {err}"))?;
            debug!(%gas_price, "using legacy transaction for {name}");
            transaction = transaction.with_gas_price(gas_price);
        }

        let pending = self
            .provider
            .send_transaction(transaction)
            .await
            .map_err(|err| anyhow!("Node rejected transaction: {err}"))?;
        debug!(tx_hash = %pending.tx_hash(), "submitted {name}");

        let receipt = pending
            .get_receipt()
            .await
            .with_context(|| "Could not get transaction receipt")?;

        if !receipt.status() {
            bail!("Transaction {} reverted", receipt.transaction_hash);
        }

        let contract_address = receipt.contract_address.ok_or_else(|| {
            anyhow!(
                "Receipt of transaction {} holds no contract address",
                receipt.transaction_hash
            )
        })?;

        Ok(Receipt {
            contract_address,
            transaction_hash: receipt.transaction_hash,
            gas_used: receipt.gas_used,
        })
    }
}
