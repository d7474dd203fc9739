use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Maps `-v` occurrences to a default filter. `RUST_LOG` wins when set.
pub fn default_filter(verbosity: u8) -> &'static str {
	// 0 = warnings only
	// 1 (-v) = sweep lifecycle and operator outcomes
	// 2+ (-vv) = per-batch tracing
	match verbosity {
		0 => "warn",
		1 => "info,cadview=debug",
		_ => "trace",
	}
}

/// Installs the global subscriber. Logs go to stderr so stdout stays JSON.
pub fn init_logging(verbosity: u8) {
	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

	let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);

	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(stderr)
		.with_target(true)
		.with_level(true)
		.compact()
		.init();
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn verbosity_raises_level() {
		assert_eq!(default_filter(0), "warn");
		assert!(default_filter(1).contains("cadview=debug"));
		assert_eq!(default_filter(2), default_filter(7));
	}
}
