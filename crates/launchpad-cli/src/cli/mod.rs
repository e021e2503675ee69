//! Command-line interface definitions.

pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Address the `merkle` command proves membership for unless told otherwise.
pub const DEFAULT_MERKLE_TARGET: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";

/// Deploy compiled contracts and inspect the accounts used to do it.
#[derive(Parser, Debug)]
#[command(name = "launchpad")]
#[command(about = "Deploy compiled contracts to EVM networks")]
#[command(version)]
pub struct Cli {
	/// Configuration file
	#[arg(
		long,
		global = true,
		env = "LAUNCHPAD_CONFIG",
		default_value = "launchpad.toml"
	)]
	pub config: PathBuf,

	/// Network to operate on (defaults to the configured default, then localhost)
	#[arg(long, global = true, env = "LAUNCHPAD_NETWORK")]
	pub network: Option<String>,

	/// Enable debug logging
	#[arg(long, global = true)]
	pub debug: bool,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
	/// Deploy a contract and print its address
	Deploy {
		/// Contract name or fully qualified `Source.sol:Name`
		#[arg(long, default_value = "Rocket")]
		contract: String,
	},

	/// Print the address of every available account
	Accounts,

	/// Run a deployment module (the built-in Apollo module by default)
	Module {
		/// Module definition in TOML
		#[arg(long)]
		file: Option<PathBuf>,
	},

	/// List the contracts found in the artifacts directory
	Artifacts,

	/// Build the allowlist Merkle tree and a proof for one address
	Merkle {
		/// File with one address per line
		#[arg(long, default_value = "eligible_addresses.txt")]
		addresses: PathBuf,

		/// Address to produce a proof for
		#[arg(long, default_value = DEFAULT_MERKLE_TARGET)]
		target: String,
	},

	/// Show the resolved configuration
	Config,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_deploy_defaults_to_rocket() {
		let cli = Cli::try_parse_from(["launchpad", "deploy"]).unwrap();
		assert_eq!(
			cli.command,
			Commands::Deploy {
				contract: "Rocket".into()
			}
		);
		assert!(!cli.debug);
	}

	#[test]
	fn test_global_flags_after_subcommand() {
		let cli = Cli::try_parse_from([
			"launchpad",
			"accounts",
			"--network",
			"mumbai",
			"--config",
			"other.toml",
			"--debug",
		])
		.unwrap();
		assert_eq!(cli.command, Commands::Accounts);
		assert_eq!(cli.network.as_deref(), Some("mumbai"));
		assert_eq!(cli.config, PathBuf::from("other.toml"));
		assert!(cli.debug);
	}

	#[test]
	fn test_merkle_defaults() {
		let cli = Cli::try_parse_from(["launchpad", "merkle"]).unwrap();
		assert_eq!(
			cli.command,
			Commands::Merkle {
				addresses: PathBuf::from("eligible_addresses.txt"),
				target: DEFAULT_MERKLE_TARGET.into(),
			}
		);
	}

	#[test]
	fn test_unknown_subcommand_rejected() {
		assert!(Cli::try_parse_from(["launchpad", "launch"]).is_err());
	}
}
