//! Capability boundaries for deploying and calling contracts.

use crate::DeployError;
use alloy_primitives::{Address, B256};
use alloy_rpc_types::TransactionReceipt;
use async_trait::async_trait;
use std::fmt;

/// Handle to a contract whose deployment the transport has confirmed.
///
/// Instances are only created from a confirmed deployment receipt, so the
/// address is always the final on-chain address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeployedContract {
	address: Address,
	transaction_hash: B256,
}

impl DeployedContract {
	/// Reads the created contract from a successful deployment receipt.
	/// Returns `None` when the receipt did not create a contract.
	pub(crate) fn from_receipt(receipt: &TransactionReceipt) -> Option<Self> {
		if !receipt.status() {
			return None;
		}
		receipt.contract_address.map(|address| Self {
			address,
			transaction_hash: receipt.transaction_hash,
		})
	}

	/// Stand-in for a confirmed deployment, for mock factories.
	#[cfg(any(test, feature = "testing"))]
	pub fn confirmed(address: Address, transaction_hash: B256) -> Self {
		Self {
			address,
			transaction_hash,
		}
	}

	pub fn address(&self) -> Address {
		self.address
	}

	/// Hash of the transaction that created the contract.
	pub fn transaction_hash(&self) -> B256 {
		self.transaction_hash
	}
}

impl fmt::Display for DeployedContract {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.address)
	}
}

/// A deployable build artifact bound to a transport.
#[async_trait]
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait ContractFactory: Send + Sync {
	/// Name of the contract this factory deploys.
	fn contract_name(&self) -> String;

	/// Submits a deployment with no constructor arguments and waits for
	/// confirmation.
	async fn deploy(&self) -> Result<DeployedContract, DeployError>;
}

/// Resolves contract names to factories.
#[async_trait]
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait FactoryProvider: Send + Sync {
	/// Returns a factory for the named contract, or
	/// [`DeployError::FactoryResolution`] when no such artifact exists.
	async fn get_factory(&self, name: &str) -> Result<Box<dyn ContractFactory>, DeployError>;
}

/// Invokes methods on deployed contracts.
#[async_trait]
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait ContractCaller: Send + Sync {
	/// Sends a zero-argument, zero-value call to `method` on `target` and
	/// waits for confirmation. Returns the transaction hash.
	async fn call(
		&self,
		contract: &str,
		target: &DeployedContract,
		method: &str,
	) -> Result<B256, DeployError>;
}
