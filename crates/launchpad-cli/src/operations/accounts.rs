//! `accounts`: print every available signer address.

use crate::Context;
use anyhow::Result;
use launchpad_deploy::ExitOutcome;
use std::io;
use tracing::info;

pub async fn run(ctx: &Context) -> Result<ExitOutcome> {
	let service = ctx.account_service()?;
	let count = service.write_addresses(&mut io::stdout().lock()).await?;
	info!(network = %ctx.network.name, count, "Accounts listed");
	Ok(ExitOutcome::Success)
}
