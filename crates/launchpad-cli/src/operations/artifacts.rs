//! `artifacts`: list deployable contract names.

use crate::cli::output::Display;
use crate::Context;
use anyhow::Result;
use launchpad_deploy::{ArtifactStore, ExitOutcome};
use std::io::{self, Write};

/// Writes one contract name per line. Returns how many were written.
pub async fn write_artifacts<W: Write>(store: &ArtifactStore, out: &mut W) -> Result<usize> {
	let names = store.list().await?;
	for name in &names {
		writeln!(out, "{}", name)?;
	}
	Ok(names.len())
}

pub async fn run(ctx: &Context) -> Result<ExitOutcome> {
	let store = ctx.artifacts();
	if write_artifacts(&store, &mut io::stdout().lock()).await? == 0 {
		Display::warning(&format!(
			"No artifacts found in {}, compile the contracts first",
			store.root().display()
		));
	}
	Ok(ExitOutcome::Success)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn write_artifact(root: &std::path::Path, source: &str, contract: &str) {
		let dir = root.join(source);
		std::fs::create_dir_all(&dir).unwrap();
		std::fs::write(
			dir.join(format!("{}.json", contract)),
			r#"{"abi": [], "bytecode": "0x6080"}"#,
		)
		.unwrap();
	}

	#[tokio::test]
	async fn test_write_artifacts_lists_names() {
		let dir = tempfile::tempdir().unwrap();
		write_artifact(dir.path(), "contracts/Rocket.sol", "Rocket");
		write_artifact(dir.path(), "contracts/ZeroDay.sol", "ZeroDay");

		let mut out = Vec::new();
		let count = write_artifacts(&ArtifactStore::new(dir.path()), &mut out).await.unwrap();
		assert_eq!(count, 2);
		assert_eq!(String::from_utf8(out).unwrap(), "Rocket\nZeroDay\n");
	}

	#[tokio::test]
	async fn test_write_artifacts_without_directory() {
		let dir = tempfile::tempdir().unwrap();
		let store = ArtifactStore::new(dir.path().join("artifacts"));
		let mut out = Vec::new();
		assert_eq!(write_artifacts(&store, &mut out).await.unwrap(), 0);
		assert!(out.is_empty());
	}
}
