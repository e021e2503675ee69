//! Account management for the launchpad deployment toolchain.
//!
//! This crate provides the account-signer provider: an ordered sequence of
//! accounts available on the selected network. Accounts either carry a local
//! signing key (taken from the network's configured credentials) or are
//! managed by the node itself and only identified by address.

use alloy_primitives::Address;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use std::io::Write;
use thiserror::Error;
use tracing::debug;

/// Re-export implementations
pub mod implementations {
	pub mod local;
	pub mod node;
}

pub use implementations::local::LocalSigners;
pub use implementations::node::NodeSigners;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// A configured key could not be parsed. Carries the position, never the key.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	/// The node could not be asked for its accounts.
	#[error("Provider error: {0}")]
	Provider(String),
	/// Writing to the reporting channel failed.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

/// A signer identity on the selected network.
#[derive(Clone)]
pub struct Account {
	address: Address,
	signer: Option<PrivateKeySigner>,
}

impl Account {
	/// An account backed by a local private key.
	pub fn local(signer: PrivateKeySigner) -> Self {
		Self {
			address: Signer::address(&signer),
			signer: Some(signer),
		}
	}

	/// An account the node signs for.
	pub fn remote(address: Address) -> Self {
		Self {
			address,
			signer: None,
		}
	}

	/// Public identifier of the account.
	pub fn address(&self) -> Address {
		self.address
	}

	/// The local signing key, if this account has one.
	pub fn signer(&self) -> Option<&PrivateKeySigner> {
		self.signer.as_ref()
	}
}

impl std::fmt::Debug for Account {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Account")
			.field("address", &self.address)
			.field("local", &self.signer.is_some())
			.finish()
	}
}

/// Trait defining the interface for account-signer providers.
///
/// Implementations return accounts in a stable order; the first account is
/// the one deployments are sent from.
#[async_trait]
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait SignerProvider: Send + Sync {
	/// Returns the ordered sequence of available accounts.
	async fn signers(&self) -> Result<Vec<Account>, AccountError>;
}

/// Service that manages account operations.
pub struct AccountService {
	implementation: Box<dyn SignerProvider>,
	network: String,
}

impl AccountService {
	/// Creates a new AccountService for the named network.
	pub fn new(implementation: Box<dyn SignerProvider>, network: impl Into<String>) -> Self {
		Self {
			implementation,
			network: network.into(),
		}
	}

	/// All accounts, in provider order.
	pub async fn signers(&self) -> Result<Vec<Account>, AccountError> {
		self.implementation.signers().await
	}

	/// Writes one address per line, in provider order.
	///
	/// Returns the number of lines written.
	pub async fn write_addresses<W: Write>(&self, out: &mut W) -> Result<usize, AccountError> {
		let accounts = self.signers().await?;
		debug!(network = %self.network, count = accounts.len(), "Listing accounts");

		for account in &accounts {
			writeln!(out, "{}", account.address())?;
		}
		Ok(accounts.len())
	}
}
