//! `merkle`: allowlist tree, root and membership proof.

use anyhow::{bail, Result};
use launchpad_deploy::ExitOutcome;
use launchpad_merkle::{read_addresses, MerkleTree};
use std::io::{self, Write};
use std::path::Path;

/// Writes the tree as pretty JSON, then the root, then the proof for `target`.
///
/// Fails without writing anything when `target` is not in the list.
pub fn report<W: Write>(addresses: &[String], target: &str, out: &mut W) -> Result<()> {
	let tree = MerkleTree::from_addresses(addresses)?;
	let Some(proof) = tree.proof(target) else {
		bail!("Address {} is not in the allowlist", target);
	};

	writeln!(out, "Merkle Tree: {}", tree.to_json_pretty()?)?;
	writeln!(out, "Merkle Root: {}", tree.root())?;
	writeln!(
		out,
		"Merkle Proof for {}: {}",
		target,
		serde_json::to_string(&proof)?
	)?;
	Ok(())
}

pub fn run(addresses: &Path, target: &str) -> Result<ExitOutcome> {
	let addresses = read_addresses(addresses)?;
	report(&addresses, target, &mut io::stdout().lock())?;
	Ok(ExitOutcome::Success)
}
