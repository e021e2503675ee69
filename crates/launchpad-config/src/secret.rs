//! Redacting wrapper for secret configuration values.

use serde::{Deserialize, Deserializer};
use std::fmt;

/// A string whose contents never appear in `Debug` or `Display` output.
///
/// Used for signing keys resolved from the environment. Callers reach the
/// value through [`SecretString::with_exposed`].
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
	/// Runs `f` with the exposed secret value.
	pub fn with_exposed<R>(&self, f: impl FnOnce(&str) -> R) -> R {
		f(&self.0)
	}

	/// Whether the secret is empty after trimming whitespace.
	pub fn is_blank(&self) -> bool {
		self.0.trim().is_empty()
	}
}

impl From<&str> for SecretString {
	fn from(value: &str) -> Self {
		Self(value.to_string())
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Self(value)
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("SecretString(<redacted>)")
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("<redacted>")
	}
}

impl<'de> Deserialize<'de> for SecretString {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		String::deserialize(deserializer).map(Self)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_secret_is_redacted() {
		let secret = SecretString::from("0xdeadbeef");
		assert_eq!(format!("{}", secret), "<redacted>");
		assert!(!format!("{:?}", secret).contains("deadbeef"));
		secret.with_exposed(|s| assert_eq!(s, "0xdeadbeef"));
	}

	#[test]
	fn test_blank_secret() {
		assert!(SecretString::from("  ").is_blank());
		assert!(!SecretString::from("0x01").is_blank());
	}
}
