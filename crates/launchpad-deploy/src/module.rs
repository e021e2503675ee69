//! Declarative deployment modules.
//!
//! A module is an ordered list of steps: deploy a contract, or call a method
//! on a contract deployed by an earlier step. Modules are either built in
//! code with [`ModuleBuilder`] or loaded from a TOML file:
//!
//! ```toml
//! id = "Apollo"
//!
//! [[steps]]
//! kind = "contract"
//! name = "Rocket"
//!
//! [[steps]]
//! kind = "call"
//! contract = "Rocket"
//! method = "launch"
//! ```

use crate::{ContractCaller, DeployError, DeployedContract, FactoryProvider};
use alloy_primitives::B256;
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument};

/// One step of a deployment module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleStep {
	/// Deploy the named contract artifact.
	Contract { id: String, name: String },
	/// Call `method` on the contract deployed by step `contract`.
	Call {
		id: String,
		contract: String,
		method: String,
	},
}

impl ModuleStep {
	pub fn id(&self) -> &str {
		match self {
			Self::Contract { id, .. } | Self::Call { id, .. } => id,
		}
	}
}

/// Handle to a contract step, used to wire later calls to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractFuture {
	id: String,
	name: String,
}

impl ContractFuture {
	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn name(&self) -> &str {
		&self.name
	}
}

/// A validated deployment module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentModule {
	id: String,
	steps: Vec<ModuleStep>,
}

impl DeploymentModule {
	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn steps(&self) -> &[ModuleStep] {
		&self.steps
	}

	/// Loads and validates a module from a TOML file.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, DeployError> {
		let path = path.as_ref();
		let content = tokio::fs::read_to_string(path).await.map_err(|e| {
			DeployError::InvalidModule(format!("failed to read {}: {}", path.display(), e))
		})?;
		content.parse()
	}
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModuleFile {
	id: String,
	#[serde(default)]
	steps: Vec<StepFile>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum StepFile {
	Contract {
		name: String,
		id: Option<String>,
	},
	Call {
		contract: String,
		method: String,
		id: Option<String>,
	},
}

impl FromStr for DeploymentModule {
	type Err = DeployError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let file: ModuleFile =
			toml::from_str(s).map_err(|e| DeployError::InvalidModule(e.to_string()))?;

		let mut builder = ModuleBuilder::new(&file.id);
		let mut futures: Vec<ContractFuture> = Vec::new();

		for step in file.steps {
			match step {
				StepFile::Contract { name, id } => {
					let future = match id {
						Some(id) => builder.contract_with_id(&name, &id),
						None => builder.contract(&name),
					};
					futures.push(future);
				},
				StepFile::Call {
					contract,
					method,
					id,
				} => {
					let qualified = builder.qualify(&contract);
					let target = futures
						.iter()
						.find(|f| f.id == qualified)
						.cloned()
						.ok_or_else(|| {
							DeployError::InvalidModule(format!(
								"call to '{}' references unknown contract step '{}'",
								method, contract
							))
						})?;
					match id {
						Some(id) => builder.call_with_id(&target, &method, &id),
						None => builder.call(&target, &method),
					}
				},
			}
		}

		builder.build()
	}
}

/// Builds a [`DeploymentModule`] step by step.
#[derive(Debug)]
pub struct ModuleBuilder {
	id: String,
	steps: Vec<ModuleStep>,
}

impl ModuleBuilder {
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			steps: Vec::new(),
		}
	}

	/// Adds a contract deployment with the default id `<module>#<name>`.
	pub fn contract(&mut self, name: &str) -> ContractFuture {
		let id = format!("{}#{}", self.id, name);
		self.push_contract(name, id)
	}

	/// Adds a contract deployment with an explicit id.
	pub fn contract_with_id(&mut self, name: &str, id: &str) -> ContractFuture {
		let id = self.qualify(id);
		self.push_contract(name, id)
	}

	/// Adds a call with the default id `<module>#<contract>.<method>`.
	pub fn call(&mut self, contract: &ContractFuture, method: &str) {
		let suffix = contract
			.id
			.strip_prefix(&format!("{}#", self.id))
			.unwrap_or(&contract.id);
		let id = format!("{}#{}.{}", self.id, suffix, method);
		self.push_call(contract, method, id);
	}

	/// Adds a call with an explicit id.
	pub fn call_with_id(&mut self, contract: &ContractFuture, method: &str, id: &str) {
		let id = self.qualify(id);
		self.push_call(contract, method, id);
	}

	/// Validates the collected steps.
	pub fn build(self) -> Result<DeploymentModule, DeployError> {
		if self.id.trim().is_empty() {
			return Err(DeployError::InvalidModule("module id cannot be empty".into()));
		}
		if self.id.contains('#') {
			return Err(DeployError::InvalidModule(format!(
				"module id '{}' cannot contain '#'",
				self.id
			)));
		}

		let mut seen = HashSet::new();
		let mut deployed = HashSet::new();
		for step in &self.steps {
			if !seen.insert(step.id()) {
				return Err(DeployError::InvalidModule(format!(
					"duplicate step id '{}'",
					step.id()
				)));
			}
			match step {
				ModuleStep::Contract { id, name } => {
					if name.trim().is_empty() {
						return Err(DeployError::InvalidModule(format!(
							"step '{}' has an empty contract name",
							id
						)));
					}
					deployed.insert(id.as_str());
				},
				ModuleStep::Call {
					id,
					contract,
					method,
				} => {
					if method.trim().is_empty() {
						return Err(DeployError::InvalidModule(format!(
							"step '{}' has an empty method name",
							id
						)));
					}
					if !deployed.contains(contract.as_str()) {
						return Err(DeployError::InvalidModule(format!(
							"step '{}' calls '{}' before it is deployed",
							id, contract
						)));
					}
				},
			}
		}

		Ok(DeploymentModule {
			id: self.id,
			steps: self.steps,
		})
	}

	fn qualify(&self, id: &str) -> String {
		if id.contains('#') {
			id.to_string()
		} else {
			format!("{}#{}", self.id, id)
		}
	}

	fn push_contract(&mut self, name: &str, id: String) -> ContractFuture {
		self.steps.push(ModuleStep::Contract {
			id: id.clone(),
			name: name.to_string(),
		});
		ContractFuture {
			id,
			name: name.to_string(),
		}
	}

	fn push_call(&mut self, contract: &ContractFuture, method: &str, id: String) {
		self.steps.push(ModuleStep::Call {
			id,
			contract: contract.id.clone(),
			method: method.to_string(),
		});
	}
}

/// The built-in module: deploy `Rocket`, then call `launch()` on it.
pub fn apollo_module() -> Result<DeploymentModule, DeployError> {
	let mut builder = ModuleBuilder::new("Apollo");
	let rocket = builder.contract("Rocket");
	builder.call(&rocket, "launch");
	builder.build()
}

/// A contract deployed by a module step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedFuture {
	pub id: String,
	pub contract_name: String,
	pub contract: DeployedContract,
}

/// A call executed by a module step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedCall {
	pub id: String,
	pub method: String,
	pub transaction_hash: B256,
}

/// Outcome of a completed module run, in step order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDeployment {
	pub module_id: String,
	pub contracts: Vec<DeployedFuture>,
	pub calls: Vec<ExecutedCall>,
}

impl ModuleDeployment {
	/// Writes one `<step id> - <address>` line per deployed contract.
	pub fn write_addresses<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
		for deployed in &self.contracts {
			writeln!(out, "{} - {}", deployed.id, deployed.contract.address())?;
		}
		Ok(())
	}

	pub fn contract(&self, id: &str) -> Option<&DeployedContract> {
		self.contracts
			.iter()
			.find(|d| d.id == id)
			.map(|d| &d.contract)
	}
}

/// Runs module steps in order against a factory provider and a caller.
#[derive(Clone)]
pub struct ModuleExecutor {
	factories: Arc<dyn FactoryProvider>,
	caller: Arc<dyn ContractCaller>,
}

impl ModuleExecutor {
	pub fn new(factories: Arc<dyn FactoryProvider>, caller: Arc<dyn ContractCaller>) -> Self {
		Self { factories, caller }
	}

	/// Executes every step; the first failing step aborts the run.
	#[instrument(skip_all, fields(module = %module.id()))]
	pub async fn execute(&self, module: &DeploymentModule) -> Result<ModuleDeployment, DeployError> {
		let mut deployment = ModuleDeployment {
			module_id: module.id().to_string(),
			contracts: Vec::new(),
			calls: Vec::new(),
		};

		for step in module.steps() {
			match step {
				ModuleStep::Contract { id, name } => {
					info!(step = %id, contract = %name, "Deploying contract");
					let factory = self.factories.get_factory(name).await?;
					let contract = factory.deploy().await?;
					info!(step = %id, address = %contract.address(), "Contract deployed");
					deployment.contracts.push(DeployedFuture {
						id: id.clone(),
						contract_name: name.clone(),
						contract,
					});
				},
				ModuleStep::Call {
					id,
					contract,
					method,
				} => {
					let target = deployment
						.contracts
						.iter()
						.find(|d| &d.id == contract)
						.ok_or_else(|| {
							DeployError::InvalidModule(format!(
								"step '{}' references undeployed contract '{}'",
								id, contract
							))
						})?;
					info!(step = %id, target = %target.contract.address(), %method, "Calling contract");
					let transaction_hash = self
						.caller
						.call(&target.contract_name, &target.contract, method)
						.await?;
					info!(step = %id, tx_hash = %transaction_hash, "Call confirmed");
					deployment.calls.push(ExecutedCall {
						id: id.clone(),
						method: method.clone(),
						transaction_hash,
					});
				},
			}
		}

		Ok(deployment)
	}
}
