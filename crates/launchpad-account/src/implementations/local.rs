//! Accounts backed by locally held private keys.
//!
//! Keys come from the selected network's `accounts` list, which the
//! configuration layer has already resolved from the environment.

use crate::{Account, AccountError, SignerProvider};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use launchpad_config::{NetworkConfig, SecretString};

/// Signer provider over a fixed, ordered list of private keys.
#[derive(Debug, Clone)]
pub struct LocalSigners {
	accounts: Vec<Account>,
}

impl LocalSigners {
	/// Parses each key, keeping configuration order.
	///
	/// Keys are 32-byte hex strings with or without a `0x` prefix. When
	/// `chain_id` is set every signer is bound to it for EIP-155.
	pub fn from_keys(keys: &[SecretString], chain_id: Option<u64>) -> Result<Self, AccountError> {
		let accounts = keys
			.iter()
			.enumerate()
			.map(|(index, key)| {
				let signer = key
					.with_exposed(|k| k.trim().parse::<PrivateKeySigner>())
					.map_err(|_| {
						AccountError::InvalidKey(format!(
							"accounts[{index}] is not a 32-byte hex private key"
						))
					})?;
				Ok(Account::local(signer.with_chain_id(chain_id)))
			})
			.collect::<Result<Vec<_>, AccountError>>()?;

		Ok(Self { accounts })
	}

	/// Builds the provider from a network entry.
	pub fn from_network(network: &NetworkConfig) -> Result<Self, AccountError> {
		Self::from_keys(&network.accounts, network.chain_id)
	}

	/// The account the keys list starts with.
	pub fn first(&self) -> Option<&Account> {
		self.accounts.first()
	}

	pub fn len(&self) -> usize {
		self.accounts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.accounts.is_empty()
	}
}

#[async_trait]
impl SignerProvider for LocalSigners {
	async fn signers(&self) -> Result<Vec<Account>, AccountError> {
		Ok(self.accounts.clone())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_keys_with_and_without_prefix() {
		let keys = vec![
			SecretString::from("0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"),
			SecretString::from("59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d"),
		];
		let provider = LocalSigners::from_keys(&keys, Some(31337)).unwrap();
		assert_eq!(provider.len(), 2);

		let accounts = provider.signers().await.unwrap();
		assert_eq!(
			accounts[0].address().to_string(),
			"0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
		);
		assert_eq!(
			accounts[1].address().to_string(),
			"0x70997970C51812dc3A010C7d01b50e0d17dc79C8"
		);
		assert_eq!(accounts[0].signer().unwrap().chain_id(), Some(31337));
		assert_eq!(provider.first().unwrap().address(), accounts[0].address());
	}

	#[test]
	fn test_invalid_key_reports_position_only() {
		let keys = vec![
			SecretString::from("0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"),
			SecretString::from("0xnot-a-key"),
		];
		let err = LocalSigners::from_keys(&keys, None).unwrap_err();
		let message = err.to_string();
		assert!(message.contains("accounts[1]"));
		assert!(!message.contains("not-a-key"));
	}

	#[test]
	fn test_short_key_rejected() {
		let keys = vec![SecretString::from("0x1234")];
		assert!(matches!(
			LocalSigners::from_keys(&keys, None),
			Err(AccountError::InvalidKey(_))
		));
	}

	#[test]
	fn test_from_network_without_accounts() {
		let provider = LocalSigners::from_network(&NetworkConfig::localhost()).unwrap();
		assert!(provider.is_empty());
		assert!(provider.first().is_none());
	}
}
