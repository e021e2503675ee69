//! Terminal output helpers.
//!
//! Human-readable summaries go through [`Display`]. Machine-readable lines
//! (addresses, module results, Merkle output) are written uncoloured by the
//! operations themselves so they can be piped.

use colored::Colorize;

/// Static helpers for formatted terminal output.
pub struct Display;

impl Display {
	/// Section header with an underline.
	pub fn header(text: &str) {
		println!("\n{}", text.bold().cyan());
		println!("{}", "─".repeat(text.chars().count()).cyan());
	}

	pub fn success(message: &str) {
		println!("{} {}", "✓".green().bold(), message);
	}

	/// Error line on stderr.
	pub fn error(message: &str) {
		eprintln!("{} {}", "✗".red().bold(), message.red());
	}

	/// Warning line on stderr, keeping stdout clean.
	pub fn warning(message: &str) {
		eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
	}

	pub fn kv(key: &str, value: &str) {
		println!("  {} {}", format!("{}:", key).bold(), value);
	}

	pub fn section(title: &str) {
		println!("\n{}", format!("▸ {}", title).bold());
	}
}
