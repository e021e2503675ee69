//! Command implementations.
//!
//! Each operation writes its machine-readable output to a caller-supplied
//! writer and returns the process outcome. The `run` entry points bind those
//! writers to stdout and stderr.

pub mod accounts;
pub mod artifacts;
pub mod config;
pub mod deploy;
pub mod merkle;
pub mod module;
