use cadview_cli::cli::Cli;
use cadview_cli::output::Reporter;
use cadview_cli::{commands, logging};
use clap::Parser;

// Single-threaded so detached releases interleave with scripted input in a
// reproducible order.
#[tokio::main(flavor = "current_thread")]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let reporter = Reporter::start(cli.command.name(), cli.format);

	if let Err(err) = commands::dispatch(cli, &reporter).await {
		if let Err(io) = reporter.report_error(err.to_command_error()) {
			tracing::error!(target = "cadview.cli", error = %io, "failed to write result envelope");
		}
		std::process::exit(1);
	}
}
