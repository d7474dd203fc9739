//! Subcommand implementations.

pub mod pick;
pub mod replay;

use std::path::Path;

use cadview::ViewerConfig;

use crate::cli::{Cli, Commands};
use crate::error::Result;
use crate::output::Reporter;

/// Runs the parsed command and prints its result envelope.
pub async fn dispatch(cli: Cli, reporter: &Reporter) -> Result<()> {
	let config = cli.config.as_deref();

	match &cli.command {
		Commands::Replay(args) => reporter.report(replay::run(&args.script, config).await?)?,
		Commands::Pick(args) => reporter.report(pick::run(args, config).await?)?,
	}
	Ok(())
}

/// `--config` wins over a config embedded in the script.
pub(crate) fn resolve_config(flag: Option<&Path>, embedded: Option<ViewerConfig>) -> Result<ViewerConfig> {
	let config = match (flag, embedded) {
		(Some(path), _) => ViewerConfig::load(path)?,
		(None, Some(config)) => {
			config.validate()?;
			config
		}
		(None, None) => ViewerConfig::default(),
	};
	Ok(config)
}
