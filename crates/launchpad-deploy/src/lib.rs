//! Contract deployment for the launchpad toolchain.
//!
//! The crate is organised around two capability boundaries. A
//! [`FactoryProvider`] turns a contract name into a deployable
//! [`ContractFactory`], and a [`ContractCaller`] invokes methods on contracts
//! that have already been deployed. The [`Orchestrator`] drives the single
//! deploy-and-report sequence on top of them, and the [`ModuleExecutor`]
//! runs declarative multi-step [`DeploymentModule`]s.
//!
//! The alloy-backed implementation of both boundaries lives in
//! [`implementations::evm::alloy`].

pub mod artifact;
pub mod factory;
pub mod module;
pub mod orchestrator;

/// Re-export implementations
pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
}

pub use artifact::{ArtifactError, ArtifactStore, ContractArtifact};
pub use factory::{ContractCaller, ContractFactory, DeployedContract, FactoryProvider};
pub use module::{
	apollo_module, ContractFuture, DeployedFuture, DeploymentModule, ExecutedCall, ModuleBuilder,
	ModuleDeployment, ModuleExecutor, ModuleStep,
};
pub use orchestrator::{DeploymentRequest, DeploymentRun, DeploymentState, ExitOutcome, Orchestrator};

#[cfg(any(test, feature = "testing"))]
pub use factory::{MockContractCaller, MockContractFactory, MockFactoryProvider};

use thiserror::Error;

/// Errors that can occur while resolving, deploying or calling contracts.
///
/// The orchestrator only ever produces the first two kinds. Both are terminal
/// and are reported identically at the process boundary.
#[derive(Debug, Error)]
pub enum DeployError {
	/// The named contract artifact is unavailable.
	#[error("Factory resolution failed for '{contract}': {reason}")]
	FactoryResolution { contract: String, reason: String },
	/// The transport rejected the deployment or could not confirm it.
	#[error("Deployment submission failed for '{contract}': {reason}")]
	DeploymentSubmission { contract: String, reason: String },
	/// A method call on a deployed contract failed.
	#[error("Call to {contract}.{method}() failed: {reason}")]
	MethodCall {
		contract: String,
		method: String,
		reason: String,
	},
	/// A deployment module is malformed.
	#[error("Invalid deployment module: {0}")]
	InvalidModule(String),
	/// The RPC endpoint could not be set up.
	#[error("Connection error: {0}")]
	Connection(String),
}

impl DeployError {
	pub(crate) fn resolution(contract: &str, reason: impl ToString) -> Self {
		Self::FactoryResolution {
			contract: contract.to_string(),
			reason: reason.to_string(),
		}
	}

	pub(crate) fn submission(contract: &str, reason: impl ToString) -> Self {
		Self::DeploymentSubmission {
			contract: contract.to_string(),
			reason: reason.to_string(),
		}
	}

	pub(crate) fn call(contract: &str, method: &str, reason: impl ToString) -> Self {
		Self::MethodCall {
			contract: contract.to_string(),
			method: method.to_string(),
			reason: reason.to_string(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_deploy_error_display() {
		let err = DeployError::resolution("Rocket", "artifact not found");
		assert_eq!(
			err.to_string(),
			"Factory resolution failed for 'Rocket': artifact not found"
		);

		let err = DeployError::submission("Rocket", "insufficient funds");
		assert_eq!(
			err.to_string(),
			"Deployment submission failed for 'Rocket': insufficient funds"
		);

		let err = DeployError::call("Rocket", "launch", "reverted");
		assert_eq!(err.to_string(), "Call to Rocket.launch() failed: reverted");
	}
}
