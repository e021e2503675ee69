//! Library side of the `launchpad` binary: argument definitions, the
//! per-invocation [`Context`] and the command implementations.

pub mod cli;
pub mod context;
pub mod logging;
pub mod operations;

pub use context::Context;
