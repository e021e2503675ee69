//! Accounts managed by the JSON-RPC node.
//!
//! Development nodes expose unlocked accounts through `eth_accounts`; when a
//! network entry lists no keys those are the accounts the toolchain uses.

use crate::{Account, AccountError, SignerProvider};
use alloy_provider::{DynProvider, Provider};
use async_trait::async_trait;
use tracing::debug;

/// Signer provider that asks the node for its accounts.
#[derive(Clone)]
pub struct NodeSigners {
	provider: DynProvider,
}

impl NodeSigners {
	pub fn new(provider: DynProvider) -> Self {
		Self { provider }
	}
}

impl std::fmt::Debug for NodeSigners {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("NodeSigners")
			.field("provider", &"<DynProvider>")
			.finish()
	}
}

#[async_trait]
impl SignerProvider for NodeSigners {
	async fn signers(&self) -> Result<Vec<Account>, AccountError> {
		let addresses = self
			.provider
			.get_accounts()
			.await
			.map_err(|e| AccountError::Provider(format!("eth_accounts failed: {}", e)))?;

		debug!(count = addresses.len(), "Node returned accounts");
		Ok(addresses.into_iter().map(Account::remote).collect())
	}
}
