//! `config`: summary of the resolved settings. Keys are never shown.

use crate::cli::output::Display;
use crate::Context;
use anyhow::Result;
use launchpad_deploy::ExitOutcome;

/// Label and value pairs describing the selected settings.
pub fn summary(ctx: &Context) -> Vec<(&'static str, String)> {
	let config = &ctx.config;
	let network = &ctx.network.config;

	let mut rows = vec![
		("Config file", ctx.config_path.display().to_string()),
		("Solidity", config.solidity.version().to_string()),
	];
	if let Some(runs) = config.solidity.optimizer_runs() {
		rows.push(("Optimizer runs", runs.to_string()));
	}
	rows.extend([
		("Artifacts", config.artifacts_dir().display().to_string()),
		("Network", ctx.network.name.clone()),
		("RPC URL", network.url.clone()),
		(
			"Chain ID",
			network
				.chain_id
				.map(|id| id.to_string())
				.unwrap_or_else(|| "from node".to_string()),
		),
		(
			"Accounts",
			if network.has_local_accounts() {
				format!("{} local key(s)", network.accounts.len())
			} else {
				"node managed".to_string()
			},
		),
		("Confirmations", config.deployment.confirmations.to_string()),
		(
			"Receipt timeout",
			format!("{}s", config.deployment.timeout_seconds),
		),
	]);
	rows
}

pub fn run(ctx: &Context) -> Result<ExitOutcome> {
	Display::header("Current Configuration");
	for (key, value) in summary(ctx) {
		Display::kv(key, &value);
	}

	let others: Vec<&str> = ctx
		.config
		.networks
		.keys()
		.map(String::as_str)
		.filter(|name| *name != ctx.network.name)
		.collect();
	if !others.is_empty() {
		Display::section("Other networks");
		for name in others {
			println!("  {}", name);
		}
	}
	Ok(ExitOutcome::Success)
}
