//! Settings resolved once per invocation and passed to every operation.

use anyhow::{Context as _, Result};
use launchpad_account::{AccountService, LocalSigners, NodeSigners, SignerProvider};
use launchpad_config::{Config, ResolvedNetwork};
use launchpad_deploy::implementations::evm::alloy::{connect, AlloyDeployer};
use launchpad_deploy::ArtifactStore;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Loaded configuration plus the network selected for this run.
#[derive(Debug, Clone)]
pub struct Context {
	pub config: Config,
	pub config_path: PathBuf,
	pub network: ResolvedNetwork,
}

impl Context {
	/// Reads the configuration file and selects the network.
	pub async fn load(config_path: &Path, network: Option<&str>) -> Result<Self> {
		let config = Config::from_file(config_path)
			.await
			.with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;
		Self::from_config(config, config_path, network)
	}

	pub fn from_config(config: Config, config_path: &Path, network: Option<&str>) -> Result<Self> {
		let network = config.resolve_network(network)?;
		info!(
			network = %network.name,
			url = %network.config.url,
			local_accounts = network.config.accounts.len(),
			"Network selected"
		);
		Ok(Self {
			config,
			config_path: config_path.to_path_buf(),
			network,
		})
	}

	pub fn artifacts(&self) -> ArtifactStore {
		ArtifactStore::new(self.config.artifacts_dir())
	}

	/// Local keys when the network lists any, otherwise the node's accounts.
	pub fn signer_provider(&self) -> Result<Box<dyn SignerProvider>> {
		let network = &self.network.config;
		if network.has_local_accounts() {
			Ok(Box::new(LocalSigners::from_network(network)?))
		} else {
			debug!(network = %self.network.name, "No local keys, using node accounts");
			Ok(Box::new(NodeSigners::new(connect(network, None)?)))
		}
	}

	pub fn account_service(&self) -> Result<AccountService> {
		Ok(AccountService::new(
			self.signer_provider()?,
			self.network.name.clone(),
		))
	}

	/// Deployer sending from the first local key, or from the node's first
	/// account when the network has no keys. Makes no RPC requests.
	pub fn deployer(&self) -> Result<AlloyDeployer> {
		let network = &self.network.config;
		let local = if network.has_local_accounts() {
			LocalSigners::from_network(network)?.first().cloned()
		} else {
			None
		};

		let deployer = match local {
			Some(account) => {
				debug!(sender = %account.address(), "Deployment sender");
				let provider = connect(network, account.signer().cloned())?;
				AlloyDeployer::new(provider, self.artifacts(), &self.config.deployment)
					.with_sender(account.address())
			},
			None => {
				debug!(network = %self.network.name, "Deploying from node accounts");
				AlloyDeployer::new(connect(network, None)?, self.artifacts(), &self.config.deployment)
					.with_node_sender()
			},
		};
		Ok(deployer)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const CONFIG: &str = r#"
solidity = "0.8.24"
default_network = "devnet"

[networks.devnet]
url = "http://127.0.0.1:8545"
accounts = ["${LAUNCHPAD_CTX_TEST_KEY_A}", "${LAUNCHPAD_CTX_TEST_KEY_B}", "${LAUNCHPAD_CTX_TEST_KEY_C}"]
chain_id = 31337

[paths]
artifacts = "out"
"#;

	fn set_keys() {
		std::env::set_var(
			"LAUNCHPAD_CTX_TEST_KEY_A",
			"0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
		);
		std::env::set_var(
			"LAUNCHPAD_CTX_TEST_KEY_B",
			"0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
		);
		std::env::set_var(
			"LAUNCHPAD_CTX_TEST_KEY_C",
			"0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
		);
	}

	#[tokio::test]
	async fn test_load_selects_default_network() {
		set_keys();
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("launchpad.toml");
		std::fs::write(&path, CONFIG).unwrap();

		let ctx = Context::load(&path, None).await.unwrap();
		assert_eq!(ctx.network.name, "devnet");
		assert_eq!(ctx.artifacts().root(), dir.path().join("out"));
	}

	#[tokio::test]
	async fn test_local_accounts_listed_in_order() {
		set_keys();
		let config: Config = CONFIG.parse().unwrap();
		let ctx = Context::from_config(config, Path::new("launchpad.toml"), None).unwrap();

		let mut out = Vec::new();
		let count = ctx
			.account_service()
			.unwrap()
			.write_addresses(&mut out)
			.await
			.unwrap();
		assert_eq!(count, 3);
		assert_eq!(
			String::from_utf8(out).unwrap(),
			"0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266\n\
			 0x70997970C51812dc3A010C7d01b50e0d17dc79C8\n\
			 0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC\n"
		);
	}

	#[tokio::test]
	async fn test_deployer_built_offline() {
		set_keys();
		let mut config: Config = CONFIG.parse().unwrap();
		config.networks.get_mut("devnet").unwrap().url = "http://127.0.0.1:1".into();
		let ctx = Context::from_config(config, Path::new("launchpad.toml"), None).unwrap();
		assert!(ctx.deployer().is_ok());

		let localhost = Context::from_config(
			"solidity = \"0.8.24\"".parse().unwrap(),
			Path::new("launchpad.toml"),
			None,
		)
		.unwrap();
		assert!(localhost.deployer().is_ok());
	}

	#[test]
	fn test_unknown_network_rejected() {
		set_keys();
		let config: Config = CONFIG.parse().unwrap();
		let err = Context::from_config(config, Path::new("launchpad.toml"), Some("mainnet"))
			.unwrap_err();
		assert!(err.to_string().contains("mainnet"));
	}

	#[tokio::test]
	async fn test_missing_config_file() {
		let dir = tempfile::tempdir().unwrap();
		let err = Context::load(&dir.path().join("absent.toml"), None)
			.await
			.unwrap_err();
		assert!(err.to_string().contains("Failed to load configuration"));
	}
}
