//! Configuration module for the launchpad deployment toolchain.
//!
//! Settings are read once at process start from a TOML file and passed
//! explicitly to every component that needs them. The file declares the
//! compiler version the artifacts were built with, the named networks a
//! deployment can target, and a few tuning knobs for receipt waiting.
//!
//! ## Secrets
//!
//! Signing keys are never written into the configuration file. Each entry of
//! a network's `accounts` list must be an environment placeholder such as
//! `"${MUMBAI_PRIVATE_KEY}"`; literal keys are rejected when the file is
//! loaded. Account placeholders stay unresolved until a network is selected,
//! so only the keys of that network have to be present in the environment.
//! Placeholders anywhere else are substituted into the parsed string values
//! and may carry a default with `${VAR_NAME:-default_value}`.

mod secret;

pub use secret::SecretString;

use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Name of the network used when neither the caller nor the file picks one.
pub const LOCALHOST_NETWORK: &str = "localhost";

/// RPC endpoint of the built-in `localhost` network.
pub const LOCALHOST_URL: &str = "http://127.0.0.1:8545";

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level settings structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	/// Compiler the contract artifacts were produced with.
	pub solidity: SolidityConfig,
	/// Network used when the caller does not name one.
	#[serde(default)]
	pub default_network: Option<String>,
	/// Named network entries.
	#[serde(default)]
	pub networks: BTreeMap<String, NetworkConfig>,
	/// Filesystem locations, relative to the project root.
	#[serde(default)]
	pub paths: PathsConfig,
	/// Receipt waiting parameters.
	#[serde(default)]
	pub deployment: DeploymentConfig,
	/// Directory the configuration file lives in.
	#[serde(skip, default = "default_root")]
	pub root: PathBuf,
}

/// Compiler declaration, either a bare version string or a table.
///
/// ```toml
/// solidity = "0.8.24"
/// # or
/// [solidity]
/// version = "0.8.24"
/// optimizer_runs = 200
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SolidityConfig {
	Version(String),
	Detailed {
		version: String,
		#[serde(default)]
		optimizer_runs: Option<u32>,
	},
}

impl SolidityConfig {
	/// The declared compiler version.
	pub fn version(&self) -> &str {
		match self {
			Self::Version(version) => version,
			Self::Detailed { version, .. } => version,
		}
	}

	/// Optimizer runs, when the optimizer is enabled.
	pub fn optimizer_runs(&self) -> Option<u32> {
		match self {
			Self::Version(_) => None,
			Self::Detailed { optimizer_runs, .. } => *optimizer_runs,
		}
	}
}

/// A named network entry.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
	/// HTTP(S) JSON-RPC endpoint.
	pub url: String,
	/// Signing keys. Holds the `${VAR}` placeholders as written until
	/// [`Config::resolve_network`] replaces them with the environment values.
	/// When empty the node's own unlocked accounts are used.
	#[serde(default)]
	pub accounts: Vec<SecretString>,
	/// Chain id used for EIP-155 signing. Queried from the node when absent.
	#[serde(default)]
	pub chain_id: Option<u64>,
}

impl NetworkConfig {
	/// The implicit local development node.
	pub fn localhost() -> Self {
		Self {
			url: LOCALHOST_URL.to_string(),
			accounts: Vec::new(),
			chain_id: None,
		}
	}

	/// Whether the entry carries its own signing keys.
	pub fn has_local_accounts(&self) -> bool {
		!self.accounts.is_empty()
	}
}

/// A network entry together with the name it was selected by.
#[derive(Debug, Clone)]
pub struct ResolvedNetwork {
	pub name: String,
	pub config: NetworkConfig,
}

/// Filesystem locations.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
	/// Directory holding compiled contract artifacts.
	#[serde(default = "default_artifacts_dir")]
	pub artifacts: PathBuf,
}

impl Default for PathsConfig {
	fn default() -> Self {
		Self {
			artifacts: default_artifacts_dir(),
		}
	}
}

/// Receipt waiting parameters applied to every submitted transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentConfig {
	/// Confirmations required before a receipt is accepted.
	#[serde(default = "default_confirmations")]
	pub confirmations: u64,
	/// Upper bound on the wait for a receipt.
	#[serde(default = "default_timeout_seconds")]
	pub timeout_seconds: u64,
}

impl Default for DeploymentConfig {
	fn default() -> Self {
		Self {
			confirmations: default_confirmations(),
			timeout_seconds: default_timeout_seconds(),
		}
	}
}

fn default_root() -> PathBuf {
	PathBuf::from(".")
}

fn default_artifacts_dir() -> PathBuf {
	PathBuf::from("artifacts")
}

fn default_confirmations() -> u64 {
	1
}

fn default_timeout_seconds() -> u64 {
	300
}

const MAX_INPUT_SIZE: usize = 1024 * 1024;

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {e}")))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let var_name = var_name.as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{var_name}' not found"
					)));
				},
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Reverse order keeps earlier offsets valid.
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(*start..*end, value);
	}

	Ok(result)
}

/// Substitutes placeholders in every string value of the parsed document,
/// except the account entries of each network.
///
/// Values are replaced after parsing, so substituted text is never read
/// back as TOML.
fn resolve_document(raw: &mut toml::Value) -> Result<(), ConfigError> {
	let Some(table) = raw.as_table_mut() else {
		return Ok(());
	};

	for (key, value) in table.iter_mut() {
		match (key.as_str(), value) {
			("networks", toml::Value::Table(networks)) => {
				for network in networks.iter_mut().map(|(_, v)| v) {
					match network {
						toml::Value::Table(entry) => {
							for (field, value) in entry.iter_mut() {
								if field != "accounts" {
									resolve_strings(value)?;
								}
							}
						},
						other => resolve_strings(other)?,
					}
				}
			},
			(_, value) => resolve_strings(value)?,
		}
	}

	Ok(())
}

fn resolve_strings(value: &mut toml::Value) -> Result<(), ConfigError> {
	match value {
		toml::Value::String(text) => *text = resolve_env_vars(text)?,
		toml::Value::Array(items) => items.iter_mut().try_for_each(resolve_strings)?,
		toml::Value::Table(table) => table.iter_mut().map(|(_, v)| v).try_for_each(resolve_strings)?,
		_ => {},
	}
	Ok(())
}

/// Looks up the signing keys of `name` from their placeholders.
fn resolve_accounts(name: &str, network: &NetworkConfig) -> Result<Vec<SecretString>, ConfigError> {
	network
		.accounts
		.iter()
		.enumerate()
		.map(|(index, placeholder)| {
			let var = placeholder.with_exposed(|p| {
				p.trim()
					.trim_start_matches("${")
					.trim_end_matches('}')
					.to_string()
			});
			let key = std::env::var(&var).map_err(|_| {
				ConfigError::Validation(format!(
					"networks.{name}.accounts[{index}] references environment variable '{var}', \
					 which is not set"
				))
			})?;
			let key = SecretString::from(key);
			if key.is_blank() {
				return Err(ConfigError::Validation(format!(
					"networks.{name}.accounts[{index}] resolved to an empty value"
				)));
			}
			Ok(key)
		})
		.collect()
}

/// Rejects signing keys written directly into the file.
///
/// Runs on the raw document, before placeholders are resolved.
fn reject_inline_keys(raw: &toml::Value) -> Result<(), ConfigError> {
	let placeholder = Regex::new(r"^\$\{[A-Z_][A-Z0-9_]{0,127}\}$")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {e}")))?;

	let Some(networks) = raw.get("networks").and_then(|n| n.as_table()) else {
		return Ok(());
	};

	for (name, network) in networks {
		let Some(accounts) = network.get("accounts").and_then(|a| a.as_array()) else {
			continue;
		};
		for (index, account) in accounts.iter().enumerate() {
			let is_placeholder = account
				.as_str()
				.map(|s| placeholder.is_match(s.trim()))
				.unwrap_or(false);
			if !is_placeholder {
				return Err(ConfigError::Validation(format!(
					"networks.{name}.accounts[{index}] must reference an environment variable \
					 (for example \"${{{}_PRIVATE_KEY}}\"); literal keys are not accepted",
					name.to_uppercase().replace('-', "_")
				)));
			}
		}
	}

	Ok(())
}

impl Config {
	/// Loads configuration from a file.
	///
	/// Relative paths inside the file (such as `paths.artifacts`) are
	/// resolved against the directory containing it.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		debug!(path = %path.display(), "Loading configuration");

		let content = tokio::fs::read_to_string(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("{}: {}", path.display(), e),
			))
		})?;

		let mut config: Config = content.parse()?;
		config.root = path
			.parent()
			.filter(|p| !p.as_os_str().is_empty())
			.map(Path::to_path_buf)
			.unwrap_or_else(default_root);
		Ok(config)
	}

	/// Absolute-or-root-relative artifact directory.
	pub fn artifacts_dir(&self) -> PathBuf {
		if self.paths.artifacts.is_absolute() {
			self.paths.artifacts.clone()
		} else {
			self.root.join(&self.paths.artifacts)
		}
	}

	/// Selects the network to operate on.
	///
	/// Precedence: the explicitly requested name, then `default_network`,
	/// then the built-in `localhost` entry. `localhost` is always available,
	/// but a configured entry with that name takes priority.
	///
	/// The account placeholders of the selected entry are resolved here;
	/// other entries are left untouched.
	pub fn resolve_network(&self, requested: Option<&str>) -> Result<ResolvedNetwork, ConfigError> {
		let name = requested
			.or(self.default_network.as_deref())
			.unwrap_or(LOCALHOST_NETWORK);

		if let Some(config) = self.networks.get(name) {
			let accounts = resolve_accounts(name, config)?;
			return Ok(ResolvedNetwork {
				name: name.to_string(),
				config: NetworkConfig {
					accounts,
					..config.clone()
				},
			});
		}

		if name == LOCALHOST_NETWORK {
			return Ok(ResolvedNetwork {
				name: name.to_string(),
				config: NetworkConfig::localhost(),
			});
		}

		let mut available: Vec<&str> = self.networks.keys().map(String::as_str).collect();
		available.push(LOCALHOST_NETWORK);
		Err(ConfigError::Validation(format!(
			"Network '{}' is not configured (available: {})",
			name,
			available.join(", ")
		)))
	}

	/// Checks semantic constraints that serde cannot express.
	fn validate(&self) -> Result<(), ConfigError> {
		let version = Regex::new(r"^\d+\.\d+\.\d+$")
			.map_err(|e| ConfigError::Parse(format!("Regex error: {e}")))?;
		if !version.is_match(self.solidity.version()) {
			return Err(ConfigError::Validation(format!(
				"Invalid solidity version '{}', expected MAJOR.MINOR.PATCH",
				self.solidity.version()
			)));
		}

		for (name, network) in &self.networks {
			if name.trim().is_empty() {
				return Err(ConfigError::Validation("Network names cannot be empty".into()));
			}
			if !(network.url.starts_with("http://") || network.url.starts_with("https://")) {
				return Err(ConfigError::Validation(format!(
					"Network '{}' has unsupported RPC URL '{}', expected http:// or https://",
					name, network.url
				)));
			}
			if network.chain_id == Some(0) {
				return Err(ConfigError::Validation(format!(
					"Network '{name}' has chain_id 0"
				)));
			}
		}

		if let Some(default) = &self.default_network {
			if default != LOCALHOST_NETWORK && !self.networks.contains_key(default) {
				return Err(ConfigError::Validation(format!(
					"default_network '{default}' is not a configured network"
				)));
			}
		}

		if self.deployment.timeout_seconds == 0 {
			return Err(ConfigError::Validation(
				"deployment.timeout_seconds must be greater than zero".into(),
			));
		}

		Ok(())
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.len() > MAX_INPUT_SIZE {
			return Err(ConfigError::Validation(format!(
				"Configuration file too large: {} bytes (max: {} bytes)",
				s.len(),
				MAX_INPUT_SIZE
			)));
		}

		let mut raw: toml::Value = toml::from_str(s)?;
		reject_inline_keys(&raw)?;
		resolve_document(&mut raw)?;

		let config: Config = raw.try_into()?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const MUMBAI_CONFIG: &str = r#"
solidity = "0.8.24"
default_network = "mumbai"

[networks.mumbai]
url = "https://rpc-mumbai.maticvigil.com/"
accounts = ["${LAUNCHPAD_TEST_MUMBAI_KEY}"]
"#;

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("LAUNCHPAD_TEST_HOST", "localhost");
		std::env::set_var("LAUNCHPAD_TEST_PORT", "8545");

		let input = "url = \"http://${LAUNCHPAD_TEST_HOST}:${LAUNCHPAD_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "url = \"http://localhost:8545\"");

		std::env::remove_var("LAUNCHPAD_TEST_HOST");
		std::env::remove_var("LAUNCHPAD_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${LAUNCHPAD_MISSING_VAR:-fallback}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"fallback\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let input = "value = \"${LAUNCHPAD_MISSING_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.is_err());
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("LAUNCHPAD_MISSING_VAR"));
	}

	#[test]
	fn test_config_with_env_key() {
		std::env::set_var(
			"LAUNCHPAD_TEST_MUMBAI_KEY",
			"0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
		);

		let config: Config = MUMBAI_CONFIG.parse().unwrap();
		assert_eq!(config.solidity.version(), "0.8.24");
		assert_eq!(config.default_network.as_deref(), Some("mumbai"));
		config.networks["mumbai"].accounts[0]
			.with_exposed(|key| assert_eq!(key, "${LAUNCHPAD_TEST_MUMBAI_KEY}"));

		let network = config.resolve_network(None).unwrap();
		assert_eq!(network.name, "mumbai");
		assert_eq!(network.config.url, "https://rpc-mumbai.maticvigil.com/");
		assert_eq!(network.config.accounts.len(), 1);
		network.config.accounts[0].with_exposed(|key| assert!(key.starts_with("0x59c6")));

		assert_eq!(config.deployment.confirmations, 1);
		assert_eq!(config.deployment.timeout_seconds, 300);
		assert_eq!(config.artifacts_dir(), PathBuf::from("./artifacts"));

		std::env::remove_var("LAUNCHPAD_TEST_MUMBAI_KEY");
	}

	#[test]
	fn test_unset_key_only_affects_its_network() {
		let config_str = r#"
solidity = "0.8.24"

[networks.mumbai]
url = "https://rpc-mumbai.maticvigil.com"
accounts = ["${LAUNCHPAD_TEST_UNSET_MUMBAI_KEY}"]
chain_id = 80001
"#;
		std::env::remove_var("LAUNCHPAD_TEST_UNSET_MUMBAI_KEY");

		let config: Config = config_str.parse().unwrap();
		let localhost = config.resolve_network(None).unwrap();
		assert_eq!(localhost.name, LOCALHOST_NETWORK);

		let err = config.resolve_network(Some("mumbai")).unwrap_err();
		let message = err.to_string();
		assert!(message.contains("networks.mumbai.accounts[0]"));
		assert!(message.contains("LAUNCHPAD_TEST_UNSET_MUMBAI_KEY"));
	}

	#[test]
	fn test_shipped_config_parses_without_keys() {
		let config: Config = include_str!("../../../launchpad.toml").parse().unwrap();
		assert_eq!(config.networks["mumbai"].accounts.len(), 1);
		assert_eq!(config.networks["mumbai"].chain_id, Some(80001));

		let network = config.resolve_network(Some("localhost")).unwrap();
		assert!(!network.config.has_local_accounts());
	}

	#[test]
	fn test_blank_key_rejected_on_selection() {
		let config_str = r#"
solidity = "0.8.24"

[networks.dev]
url = "http://127.0.0.1:8545"
accounts = ["${LAUNCHPAD_TEST_BLANK_KEY}"]
"#;
		std::env::set_var("LAUNCHPAD_TEST_BLANK_KEY", "  ");

		let config: Config = config_str.parse().unwrap();
		let err = config.resolve_network(Some("dev")).unwrap_err();
		assert!(err.to_string().contains("resolved to an empty value"));

		std::env::remove_var("LAUNCHPAD_TEST_BLANK_KEY");
	}

	#[test]
	fn test_substituted_value_is_not_parsed_as_toml() {
		let injected = "out\"\n[networks.injected]\nurl = \"http://127.0.0.1:1\"\n#";
		std::env::set_var("LAUNCHPAD_TEST_ARTIFACTS_DIR", injected);

		let config_str = r#"
solidity = "0.8.24"

[paths]
artifacts = "${LAUNCHPAD_TEST_ARTIFACTS_DIR}"
"#;
		let config: Config = config_str.parse().unwrap();
		assert!(config.networks.is_empty());
		assert_eq!(config.paths.artifacts, PathBuf::from(injected));

		std::env::remove_var("LAUNCHPAD_TEST_ARTIFACTS_DIR");
	}

	#[test]
	fn test_inline_private_key_rejected() {
		let config_str = r#"
solidity = "0.8.24"

[networks.mumbai]
url = "https://rpc-mumbai.maticvigil.com/"
accounts = ["f389c0a3163c73e4a0476a96d292c06cc9b1ff8be989b7273bb72c577dfed494"]
"#;
		let err = config_str.parse::<Config>().unwrap_err();
		let message = err.to_string();
		assert!(message.contains("networks.mumbai.accounts[0]"));
		assert!(message.contains("MUMBAI_PRIVATE_KEY"));
		assert!(!message.contains("f389c0a3"));
	}

	#[test]
	fn test_placeholder_with_default_key_rejected() {
		let config_str = r#"
solidity = "0.8.24"

[networks.dev]
url = "http://127.0.0.1:8545"
accounts = ["${LAUNCHPAD_TEST_DEV_KEY:-0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80}"]
"#;
		assert!(matches!(
			config_str.parse::<Config>(),
			Err(ConfigError::Validation(_))
		));
	}

	#[test]
	fn test_detailed_solidity_table() {
		let config_str = r#"
[solidity]
version = "0.8.20"
optimizer_runs = 200
"#;
		let config: Config = config_str.parse().unwrap();
		assert_eq!(config.solidity.version(), "0.8.20");
		assert_eq!(config.solidity.optimizer_runs(), Some(200));
		assert!(config.networks.is_empty());
	}

	#[test]
	fn test_invalid_solidity_version() {
		let err = "solidity = \"latest\"".parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("latest"));
	}

	#[test]
	fn test_unsupported_url_scheme() {
		let config_str = r#"
solidity = "0.8.24"

[networks.local]
url = "ws://127.0.0.1:8545"
"#;
		let err = config_str.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("ws://127.0.0.1:8545"));
	}

	#[test]
	fn test_unknown_default_network() {
		let config_str = r#"
solidity = "0.8.24"
default_network = "sepolia"
"#;
		let err = config_str.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("sepolia"));
	}

	#[test]
	fn test_localhost_is_builtin() {
		let config: Config = "solidity = \"0.8.24\"".parse().unwrap();
		let network = config.resolve_network(None).unwrap();
		assert_eq!(network.name, LOCALHOST_NETWORK);
		assert_eq!(network.config.url, LOCALHOST_URL);
		assert!(!network.config.has_local_accounts());
	}

	#[test]
	fn test_unknown_network_lists_available() {
		let config_str = r#"
solidity = "0.8.24"

[networks.amoy]
url = "https://rpc-amoy.polygon.technology"
chain_id = 80002
"#;
		let config: Config = config_str.parse().unwrap();
		let err = config.resolve_network(Some("mainnet")).unwrap_err();
		let message = err.to_string();
		assert!(message.contains("mainnet"));
		assert!(message.contains("amoy, localhost"));

		let amoy = config.resolve_network(Some("amoy")).unwrap();
		assert_eq!(amoy.config.chain_id, Some(80002));
	}

	#[test]
	fn test_zero_timeout_rejected() {
		let config_str = r#"
solidity = "0.8.24"

[deployment]
timeout_seconds = 0
"#;
		assert!(config_str.parse::<Config>().is_err());
	}

	#[tokio::test]
	async fn test_from_file_sets_root() {
		let dir = tempfile::TempDir::new().unwrap();
		let path = dir.path().join("launchpad.toml");
		std::fs::write(
			&path,
			"solidity = \"0.8.24\"\n[paths]\nartifacts = \"out\"\n",
		)
		.unwrap();

		let config = Config::from_file(&path).await.unwrap();
		assert_eq!(config.root, dir.path());
		assert_eq!(config.artifacts_dir(), dir.path().join("out"));
	}

	#[tokio::test]
	async fn test_from_file_missing() {
		let dir = tempfile::TempDir::new().unwrap();
		let path = dir.path().join("missing.toml");
		let err = Config::from_file(&path).await.unwrap_err();
		assert!(matches!(err, ConfigError::Io(_)));
		assert!(err.to_string().contains("missing.toml"));
	}
}
