//! Compiled contract artifacts.
//!
//! Artifacts are the JSON files an external compiler writes next to each
//! source file, one per contract: `<root>/**/<Source>.sol/<Contract>.json`.
//! Both the Hardhat layout (`bytecode` is a hex string) and the Foundry
//! layout (`bytecode.object`) are understood. Hardhat's `*.dbg.json` files
//! and `build-info` directories are skipped.

use alloy_json_abi::JsonAbi;
use alloy_primitives::{hex, Bytes};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while locating or reading an artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
	#[error("Contract {name} not found in {root}")]
	NotFound { name: String, root: PathBuf },
	#[error("Artifacts directory {0} does not exist, compile the contracts first")]
	MissingDirectory(PathBuf),
	#[error("Contract name {name} is ambiguous, use a fully qualified name: {candidates}")]
	Ambiguous { name: String, candidates: String },
	#[error("Failed to read {path}: {source}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("Invalid artifact {path}: {reason}")]
	Parse { path: PathBuf, reason: String },
	#[error("Contract {0} has no creation bytecode (abstract contract or interface)")]
	MissingBytecode(String),
}

/// A compiled contract ready for deployment.
#[derive(Debug, Clone)]
pub struct ContractArtifact {
	pub name: String,
	pub abi: JsonAbi,
	pub bytecode: Bytes,
	pub path: PathBuf,
}

impl ContractArtifact {
	/// Parses an artifact JSON document.
	pub fn from_json(name: &str, path: &Path, json: &Value) -> Result<Self, ArtifactError> {
		let parse_error = |reason: String| ArtifactError::Parse {
			path: path.to_path_buf(),
			reason,
		};

		let abi_value = json
			.get("abi")
			.ok_or_else(|| parse_error("missing abi".to_string()))?;
		let abi: JsonAbi = serde_json::from_value(abi_value.clone())
			.map_err(|e| parse_error(format!("invalid abi: {}", e)))?;

		// Hardhat stores a string, Foundry an object with the code under `object`
		let bytecode_str = match json.get("bytecode") {
			Some(Value::String(s)) => s.as_str(),
			Some(obj @ Value::Object(_)) => obj
				.get("object")
				.and_then(|o| o.as_str())
				.ok_or_else(|| parse_error("bytecode object has no code".to_string()))?,
			_ => return Err(parse_error("missing bytecode".to_string())),
		};

		let hex_str = bytecode_str.strip_prefix("0x").unwrap_or(bytecode_str);
		if hex_str.contains("__$") {
			return Err(parse_error(
				"bytecode contains unlinked library references".to_string(),
			));
		}
		if hex_str.is_empty() {
			return Err(ArtifactError::MissingBytecode(name.to_string()));
		}

		let bytecode = hex::decode(hex_str)
			.map(Bytes::from)
			.map_err(|e| parse_error(format!("invalid bytecode hex: {}", e)))?;

		Ok(Self {
			name: name.to_string(),
			abi,
			bytecode,
			path: path.to_path_buf(),
		})
	}
}

/// Read-only view over a directory of compiled artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
	root: PathBuf,
}

impl ArtifactStore {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Locates the artifact file for a contract.
	///
	/// `name` is either a bare contract name (`Rocket`) or a fully qualified
	/// one (`contracts/Rocket.sol:Rocket`). A bare name must be unique.
	pub async fn find(&self, name: &str) -> Result<PathBuf, ArtifactError> {
		if !is_dir(&self.root).await {
			return Err(ArtifactError::MissingDirectory(self.root.clone()));
		}

		if let Some((source, contract)) = name.rsplit_once(':') {
			let path = self.root.join(source).join(format!("{contract}.json"));
			let is_file = tokio::fs::metadata(&path)
				.await
				.map(|m| m.is_file())
				.unwrap_or(false);
			return if is_file {
				Ok(path)
			} else {
				Err(ArtifactError::NotFound {
					name: name.to_string(),
					root: self.root.clone(),
				})
			};
		}

		let mut matches: Vec<PathBuf> = self
			.artifact_files()
			.await?
			.into_iter()
			.filter(|(_, contract)| contract == name)
			.map(|(path, _)| path)
			.collect();

		match matches.len() {
			0 => Err(ArtifactError::NotFound {
				name: name.to_string(),
				root: self.root.clone(),
			}),
			1 => Ok(matches.remove(0)),
			_ => {
				matches.sort();
				let candidates = matches
					.iter()
					.filter_map(|p| self.qualified_name(p))
					.collect::<Vec<_>>()
					.join(", ");
				Err(ArtifactError::Ambiguous {
					name: name.to_string(),
					candidates,
				})
			},
		}
	}

	/// Loads and parses a contract artifact.
	pub async fn load(&self, name: &str) -> Result<ContractArtifact, ArtifactError> {
		let path = self.find(name).await?;
		debug!(contract = name, path = %path.display(), "Loading artifact");

		let content = tokio::fs::read_to_string(&path)
			.await
			.map_err(|source| ArtifactError::Read {
				path: path.clone(),
				source,
			})?;
		let json: Value = serde_json::from_str(&content).map_err(|e| ArtifactError::Parse {
			path: path.clone(),
			reason: e.to_string(),
		})?;

		let contract = name.rsplit_once(':').map(|(_, c)| c).unwrap_or(name);
		ContractArtifact::from_json(contract, &path, &json)
	}

	/// Names of every contract in the store, sorted and deduplicated.
	pub async fn list(&self) -> Result<Vec<String>, ArtifactError> {
		if !is_dir(&self.root).await {
			return Ok(Vec::new());
		}

		let mut contracts: Vec<String> = self
			.artifact_files()
			.await?
			.into_iter()
			.map(|(_, contract)| contract)
			.collect();

		contracts.sort();
		contracts.dedup();
		Ok(contracts)
	}

	/// Every artifact file below the root with its contract name.
	async fn artifact_files(&self) -> Result<Vec<(PathBuf, String)>, ArtifactError> {
		let mut files = Vec::new();
		let mut pending = vec![self.root.clone()];

		while let Some(dir) = pending.pop() {
			let read_error = |source: std::io::Error| ArtifactError::Read {
				path: dir.clone(),
				source,
			};
			let in_source_dir = dir
				.file_name()
				.and_then(|d| d.to_str())
				.map(|d| d.ends_with(".sol"))
				.unwrap_or(false);

			let mut entries = tokio::fs::read_dir(&dir).await.map_err(read_error)?;
			while let Some(entry) = entries.next_entry().await.map_err(read_error)? {
				let path = entry.path();
				let file_name = entry.file_name();
				let Some(file_name) = file_name.to_str() else {
					continue;
				};

				if is_dir(&path).await {
					if file_name != "build-info" {
						pending.push(path);
					}
					continue;
				}

				if !in_source_dir || file_name.ends_with(".dbg.json") {
					continue;
				}
				if let Some(contract) = file_name.strip_suffix(".json") {
					files.push((path, contract.to_string()));
				}
			}
		}

		Ok(files)
	}

	/// `contracts/Rocket.sol:Rocket` for `<root>/contracts/Rocket.sol/Rocket.json`.
	fn qualified_name(&self, path: &Path) -> Option<String> {
		let contract = path.file_stem()?.to_str()?;
		let source = path.parent()?.strip_prefix(&self.root).ok()?;
		Some(format!("{}:{}", source.display(), contract))
	}
}

async fn is_dir(path: &Path) -> bool {
	tokio::fs::metadata(path)
		.await
		.map(|m| m.is_dir())
		.unwrap_or(false)
}
