//! `launchpad` entry point.
//!
//! Parses arguments, sets up logging on stderr, loads the configuration once
//! and dispatches to the selected operation. Every command exits with 0 on
//! success and 1 on failure.

use anyhow::Result;
use clap::Parser;
use launchpad_cli::{
	cli::{output::Display, Cli, Commands},
	logging, operations, Context,
};
use launchpad_deploy::ExitOutcome;
use std::process::ExitCode;
use tracing::{debug, instrument};

#[tokio::main]
async fn main() -> ExitCode {
	let _ = dotenvy::dotenv();

	let cli = Cli::parse();
	logging::init(cli.debug);

	match run(cli).await {
		Ok(outcome) => outcome.into(),
		Err(e) => {
			debug!(error = ?e, "Command failed");
			Display::error(&format!("{:#}", e));
			ExitOutcome::Failure.into()
		},
	}
}

#[instrument(skip_all, fields(command = ?cli.command))]
async fn run(cli: Cli) -> Result<ExitOutcome> {
	let load = || Context::load(&cli.config, cli.network.as_deref());

	match &cli.command {
		Commands::Deploy { contract } => operations::deploy::run(&load().await?, contract).await,
		Commands::Accounts => operations::accounts::run(&load().await?).await,
		Commands::Module { file } => {
			operations::module::run(&load().await?, file.as_deref()).await
		},
		Commands::Artifacts => operations::artifacts::run(&load().await?).await,
		Commands::Config => operations::config::run(&load().await?),
		// Works on a plain address file, no configuration needed.
		Commands::Merkle { addresses, target } => operations::merkle::run(addresses, target),
	}
}
