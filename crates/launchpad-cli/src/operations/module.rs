//! `module`: run a deployment module and print each deployed contract.

use crate::Context;
use anyhow::Result;
use launchpad_deploy::{apollo_module, DeploymentModule, ExitOutcome, ModuleExecutor};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Executes `module` and writes `<step id> - <address>` lines.
pub async fn execute_module<W: Write>(
	executor: &ModuleExecutor,
	module: &DeploymentModule,
	out: &mut W,
) -> Result<()> {
	let deployment = executor.execute(module).await?;
	deployment.write_addresses(out)?;
	info!(
		module = %deployment.module_id,
		contracts = deployment.contracts.len(),
		calls = deployment.calls.len(),
		"Module complete"
	);
	Ok(())
}

/// The module from `file`, or the built-in Apollo module.
pub async fn load_module(file: Option<&Path>) -> Result<DeploymentModule> {
	let module = match file {
		Some(path) => DeploymentModule::from_file(path).await?,
		None => apollo_module()?,
	};
	Ok(module)
}

pub async fn run(ctx: &Context, file: Option<&Path>) -> Result<ExitOutcome> {
	let module = load_module(file).await?;
	let deployer = Arc::new(ctx.deployer()?);
	let executor = ModuleExecutor::new(deployer.clone(), deployer);

	execute_module(&executor, &module, &mut io::stdout().lock()).await?;
	Ok(ExitOutcome::Success)
}
