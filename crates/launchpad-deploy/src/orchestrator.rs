//! Single-contract deployment orchestration.
//!
//! The orchestrator runs a strictly ordered sequence: resolve a factory for
//! the requested contract, submit the deployment, then report the confirmed
//! address. Any failure is terminal for the run; there are no retries.
//!
//! ```text
//! Resolving ──▶ Deploying ──▶ Done
//!     │             │
//!     └─────▶ Failed ◀┘
//! ```

use crate::{DeployError, DeployedContract, FactoryProvider};
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Prefix of the line reported after a successful deployment.
pub const SUCCESS_MESSAGE: &str = "Success! Contract was deployed to:";

/// Identifies the contract to deploy. Constructor arguments are not supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentRequest {
	contract: String,
}

impl DeploymentRequest {
	pub fn new(contract: impl Into<String>) -> Self {
		Self {
			contract: contract.into(),
		}
	}

	pub fn contract(&self) -> &str {
		&self.contract
	}
}

/// Progress of a single deployment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentState {
	Resolving,
	Deploying,
	Done,
	Failed,
}

impl DeploymentState {
	pub fn is_terminal(self) -> bool {
		matches!(self, Self::Done | Self::Failed)
	}

	/// Moves to the next state on the success path. Terminal states stay put.
	pub fn advance(self) -> Self {
		match self {
			Self::Resolving => Self::Deploying,
			Self::Deploying => Self::Done,
			terminal => terminal,
		}
	}

	/// Moves to `Failed` from any non-terminal state.
	pub fn fail(self) -> Self {
		if self.is_terminal() {
			self
		} else {
			Self::Failed
		}
	}
}

/// Process-level result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
	Success,
	Failure,
}

impl ExitOutcome {
	pub fn code(self) -> u8 {
		match self {
			Self::Success => 0,
			Self::Failure => 1,
		}
	}
}

impl From<ExitOutcome> for ExitCode {
	fn from(outcome: ExitOutcome) -> Self {
		ExitCode::from(outcome.code())
	}
}

/// Final state of a run together with its result.
#[derive(Debug)]
pub struct DeploymentRun {
	pub state: DeploymentState,
	pub result: Result<DeployedContract, DeployError>,
}

/// Drives the resolve-deploy-report sequence.
#[derive(Clone)]
pub struct Orchestrator {
	factories: Arc<dyn FactoryProvider>,
}

impl Orchestrator {
	pub fn new(factories: Arc<dyn FactoryProvider>) -> Self {
		Self { factories }
	}

	/// Runs the sequence once and returns the terminal state reached.
	#[instrument(skip(self), fields(contract = %request.contract()))]
	pub async fn run(&self, request: &DeploymentRequest) -> DeploymentRun {
		let mut state = DeploymentState::Resolving;
		info!(?state, "Resolving contract factory");

		let factory = match self.factories.get_factory(request.contract()).await {
			Ok(factory) => factory,
			Err(e) => {
				state = state.fail();
				debug!(?state, error = %e, "Factory resolution failed");
				return DeploymentRun {
					state,
					result: Err(e),
				};
			},
		};

		state = state.advance();
		info!(?state, "Submitting deployment");

		match factory.deploy().await {
			Ok(deployed) => {
				state = state.advance();
				info!(
					?state,
					address = %deployed.address(),
					tx_hash = %deployed.transaction_hash(),
					"Contract deployed"
				);
				DeploymentRun {
					state,
					result: Ok(deployed),
				}
			},
			Err(e) => {
				state = state.fail();
				debug!(?state, error = %e, "Deployment submission failed");
				DeploymentRun {
					state,
					result: Err(e),
				}
			},
		}
	}

	/// Deploys the requested contract.
	pub async fn deploy(&self, request: &DeploymentRequest) -> Result<DeployedContract, DeployError> {
		self.run(request).await.result
	}

	/// Deploys and reports the outcome as exactly one line.
	///
	/// On success the address line goes to `out`; on failure the error goes
	/// to `err` and nothing is written to `out`.
	pub async fn execute<O: Write, E: Write>(
		&self,
		request: &DeploymentRequest,
		out: &mut O,
		err: &mut E,
	) -> ExitOutcome {
		let written = match self.deploy(request).await {
			Ok(deployed) => {
				writeln!(out, "{} {}", SUCCESS_MESSAGE, deployed.address()).map(|_| ExitOutcome::Success)
			},
			Err(e) => writeln!(err, "Error: {}", e).map(|_| ExitOutcome::Failure),
		};

		written.unwrap_or(ExitOutcome::Failure)
	}
}
