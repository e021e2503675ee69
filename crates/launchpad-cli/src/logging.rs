//! Structured logs on stderr, kept apart from command output.
//!
//! At the default level only warnings from the launchpad crates are shown,
//! so a failed command leaves its single `Error:` line as the only output on
//! stderr. `--debug` or `RUST_LOG` turn the progress events back on.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directives used when `RUST_LOG` is not set.
pub fn default_directives(debug: bool) -> &'static str {
	if debug {
		"launchpad=debug,info"
	} else {
		"launchpad=warn,warn"
	}
}

/// Installs the global subscriber. `RUST_LOG` takes precedence.
pub fn init(debug: bool) {
	let env_filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(default_directives(debug)));

	tracing_subscriber::registry()
		.with(
			fmt::layer()
				.with_writer(std::io::stderr)
				.with_target(true)
				.with_thread_ids(false)
				.with_file(false)
				.with_line_number(false)
				.compact(),
		)
		.with(env_filter)
		.init();
}
