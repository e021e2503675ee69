//! Alloy-backed contract deployment.
//!
//! [`AlloyDeployer`] resolves factories from an [`ArtifactStore`] and submits
//! deployments and calls through an erased alloy provider. When the provider
//! carries a wallet it signs locally; otherwise the node signs for the
//! configured sender. Nothing is sent to the node before a factory has been
//! resolved.

use crate::{
	ArtifactError, ArtifactStore, ContractArtifact, ContractCaller, ContractFactory, DeployError,
	DeployedContract, FactoryProvider,
};
use alloy_json_abi::JsonAbi;
use alloy_network::{EthereumWallet, TransactionBuilder};
use alloy_primitives::{Address, Bytes, B256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types::{TransactionReceipt, TransactionRequest};
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use launchpad_config::{DeploymentConfig, NetworkConfig};
use std::time::Duration;
use tracing::{debug, info};

/// Builds an erased provider for `network`.
///
/// With a signer the provider fills and signs transactions locally; without
/// one, transactions are sent unsigned for the node to sign.
pub fn connect(
	network: &NetworkConfig,
	signer: Option<PrivateKeySigner>,
) -> Result<DynProvider, DeployError> {
	let url = network
		.url
		.parse()
		.map_err(|e| DeployError::Connection(format!("Invalid RPC URL '{}': {}", network.url, e)))?;

	let provider = match signer {
		Some(signer) => ProviderBuilder::new()
			.wallet(EthereumWallet::from(signer))
			.connect_http(url)
			.erased(),
		None => ProviderBuilder::new().connect_http(url).erased(),
	};
	Ok(provider)
}

/// Where the `from` field of submitted transactions comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sender {
	/// Filled by the provider's wallet.
	Wallet,
	Fixed(Address),
	/// First entry of the node's `eth_accounts`, looked up per submission.
	NodeAccounts,
}

/// Deploys artifacts and calls contracts over an alloy provider.
#[derive(Clone)]
pub struct AlloyDeployer {
	provider: DynProvider,
	artifacts: ArtifactStore,
	sender: Sender,
	confirmations: u64,
	timeout: Duration,
}

impl AlloyDeployer {
	pub fn new(provider: DynProvider, artifacts: ArtifactStore, deployment: &DeploymentConfig) -> Self {
		Self {
			provider,
			artifacts,
			sender: Sender::Wallet,
			confirmations: deployment.confirmations,
			timeout: Duration::from_secs(deployment.timeout_seconds),
		}
	}

	/// Sets the sender explicitly.
	pub fn with_sender(mut self, from: Address) -> Self {
		self.sender = Sender::Fixed(from);
		self
	}

	/// Sends from the node's first unlocked account.
	pub fn with_node_sender(mut self) -> Self {
		self.sender = Sender::NodeAccounts;
		self
	}

	async fn node_sender(&self) -> Result<Address, String> {
		let accounts = self
			.provider
			.get_accounts()
			.await
			.map_err(|e| format!("Failed to query node accounts: {}", e))?;
		let sender = accounts
			.first()
			.copied()
			.ok_or_else(|| "Node reported no unlocked accounts".to_string())?;
		debug!(%sender, "Using node account");
		Ok(sender)
	}

	async fn send_and_confirm(
		&self,
		mut tx: TransactionRequest,
	) -> Result<TransactionReceipt, String> {
		match self.sender {
			Sender::Wallet => {},
			Sender::Fixed(from) => tx = tx.with_from(from),
			Sender::NodeAccounts => tx = tx.with_from(self.node_sender().await?),
		}

		let pending = self
			.provider
			.send_transaction(tx)
			.await
			.map_err(|e| format!("Failed to send transaction: {}", e))?;
		debug!(tx_hash = %pending.tx_hash(), "Transaction submitted");

		let receipt = pending
			.with_required_confirmations(self.confirmations)
			.with_timeout(Some(self.timeout))
			.get_receipt()
			.await
			.map_err(|e| format!("Failed to confirm transaction: {}", e))?;

		if !receipt.status() {
			return Err(format!(
				"Transaction {} reverted",
				receipt.transaction_hash
			));
		}
		Ok(receipt)
	}

	async fn load(&self, name: &str) -> Result<ContractArtifact, DeployError> {
		self.artifacts
			.load(name)
			.await
			.map_err(|e: ArtifactError| DeployError::resolution(name, e))
	}
}

/// Factory for a single loaded artifact.
pub struct AlloyFactory {
	deployer: AlloyDeployer,
	artifact: ContractArtifact,
}

#[async_trait]
impl ContractFactory for AlloyFactory {
	fn contract_name(&self) -> String {
		self.artifact.name.clone()
	}

	async fn deploy(&self) -> Result<DeployedContract, DeployError> {
		let name = &self.artifact.name;
		info!(
			contract = %name,
			bytecode_len = self.artifact.bytecode.len(),
			"Deploying contract"
		);

		let tx = TransactionRequest::default().with_deploy_code(self.artifact.bytecode.clone());
		let receipt = self
			.deployer
			.send_and_confirm(tx)
			.await
			.map_err(|reason| DeployError::submission(name, reason))?;

		DeployedContract::from_receipt(&receipt)
			.ok_or_else(|| DeployError::submission(name, "No contract address in receipt"))
	}
}

#[async_trait]
impl FactoryProvider for AlloyDeployer {
	async fn get_factory(&self, name: &str) -> Result<Box<dyn ContractFactory>, DeployError> {
		let artifact = self.load(name).await?;
		debug!(contract = %name, path = %artifact.path.display(), "Resolved artifact");
		Ok(Box::new(AlloyFactory {
			deployer: self.clone(),
			artifact,
		}))
	}
}

#[async_trait]
impl ContractCaller for AlloyDeployer {
	async fn call(
		&self,
		contract: &str,
		target: &DeployedContract,
		method: &str,
	) -> Result<B256, DeployError> {
		let artifact = self.load(contract).await?;
		let calldata = zero_arg_selector(&artifact.abi, contract, method)?;

		let tx = TransactionRequest::default()
			.with_to(target.address())
			.with_input(calldata);
		let receipt = self
			.send_and_confirm(tx)
			.await
			.map_err(|reason| DeployError::call(contract, method, reason))?;

		Ok(receipt.transaction_hash)
	}
}

/// Calldata for a zero-argument method.
fn zero_arg_selector(abi: &JsonAbi, contract: &str, method: &str) -> Result<Bytes, DeployError> {
	let overloads = abi
		.function(method)
		.ok_or_else(|| DeployError::call(contract, method, "no such function in ABI"))?;

	overloads
		.iter()
		.find(|f| f.inputs.is_empty())
		.map(|f| Bytes::copy_from_slice(f.selector().as_slice()))
		.ok_or_else(|| DeployError::call(contract, method, "function takes arguments"))
}
