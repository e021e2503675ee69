//! `deploy`: resolve, deploy and report one contract.

use crate::Context;
use anyhow::Result;
use launchpad_deploy::{DeploymentRequest, ExitOutcome, FactoryProvider, Orchestrator};
use std::io::{self, Write};
use std::sync::Arc;

/// Deploys `contract` through `factories`, reporting exactly one line.
pub async fn deploy_with<O: Write, E: Write>(
	factories: Arc<dyn FactoryProvider>,
	contract: &str,
	out: &mut O,
	err: &mut E,
) -> ExitOutcome {
	Orchestrator::new(factories)
		.execute(&DeploymentRequest::new(contract), out, err)
		.await
}

/// Deploys `contract` on the context's network.
pub async fn run_with<O: Write, E: Write>(
	ctx: &Context,
	contract: &str,
	out: &mut O,
	err: &mut E,
) -> Result<ExitOutcome> {
	let deployer = ctx.deployer()?;
	Ok(deploy_with(Arc::new(deployer), contract, out, err).await)
}

pub async fn run(ctx: &Context, contract: &str) -> Result<ExitOutcome> {
	run_with(
		ctx,
		contract,
		&mut io::stdout().lock(),
		&mut io::stderr().lock(),
	)
	.await
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{Address, B256};
	use launchpad_config::Config;
	use std::path::Path;
	use launchpad_deploy::{
		ContractFactory, DeployError, DeployedContract, MockContractFactory, MockFactoryProvider,
	};

	#[tokio::test]
	async fn test_deploy_with_reports_success_line() {
		let address = Address::repeat_byte(0xab);
		let mut provider = MockFactoryProvider::new();
		provider.expect_get_factory().returning(move |_| {
			Box::pin(async move {
				let mut factory = MockContractFactory::new();
				factory.expect_deploy().returning(move || {
					Box::pin(async move { Ok(DeployedContract::confirmed(address, B256::ZERO)) })
				});
				Ok(Box::new(factory) as Box<dyn ContractFactory>)
			})
		});

		let mut out = Vec::new();
		let mut err = Vec::new();
		let outcome = deploy_with(Arc::new(provider), "Rocket", &mut out, &mut err).await;

		assert_eq!(outcome.code(), 0);
		assert_eq!(
			String::from_utf8(out).unwrap(),
			format!("Success! Contract was deployed to: {}\n", address)
		);
	}

	#[tokio::test]
	async fn test_deploy_with_unknown_contract() {
		let mut provider = MockFactoryProvider::new();
		provider.expect_get_factory().returning(|name| {
			let err = DeployError::FactoryResolution {
				contract: name.to_string(),
				reason: "Contract Shuttle not found in artifacts".into(),
			};
			Box::pin(async move { Err(err) })
		});

		let mut out = Vec::new();
		let mut err = Vec::new();
		let outcome = deploy_with(Arc::new(provider), "Shuttle", &mut out, &mut err).await;

		assert_eq!(outcome.code(), 1);
		assert!(out.is_empty());
		assert!(String::from_utf8(err).unwrap().contains("'Shuttle'"));
	}

	#[tokio::test]
	async fn test_missing_artifact_reported_before_node_is_contacted() {
		let dir = tempfile::tempdir().unwrap();
		let mut config: Config = r#"
solidity = "0.8.24"
default_network = "offline"

[networks.offline]
url = "http://127.0.0.1:1"
"#
		.parse()
		.unwrap();
		config.root = dir.path().to_path_buf();
		let ctx = Context::from_config(config, Path::new("launchpad.toml"), None).unwrap();

		let mut out = Vec::new();
		let mut err = Vec::new();
		let outcome = run_with(&ctx, "Rocket", &mut out, &mut err).await.unwrap();

		assert_eq!(outcome, ExitOutcome::Failure);
		assert!(out.is_empty());
		let message = String::from_utf8(err).unwrap();
		assert_eq!(message.lines().count(), 1);
		assert!(message.contains("Factory resolution failed for 'Rocket'"));
	}
}
