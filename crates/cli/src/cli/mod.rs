use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;
use crate::styles::CLI_STYLES;

#[derive(Parser, Debug)]
#[command(name = "cadview")]
#[command(about = "Replay selection gestures against a CAD scene")]
#[command(version)]
#[command(styles = CLI_STYLES)]
pub struct Cli {
	/// Increase verbosity (-v debug for cadview, -vv trace)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format
	#[arg(short = 'f', long, global = true, value_enum, default_value = "json")]
	pub format: OutputFormat,

	/// Viewer configuration file (JSON); overrides any config in the script
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Run a gesture script and print the resulting selection
	Replay(ReplayArgs),

	/// Pick the front-most node at a point
	Pick(PickArgs),
}

impl Commands {
	pub fn name(&self) -> &'static str {
		match self {
			Commands::Replay(_) => "replay",
			Commands::Pick(_) => "pick",
		}
	}
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
	/// Gesture script (JSON)
	#[arg(value_name = "SCRIPT")]
	pub script: PathBuf,
}

#[derive(Args, Debug)]
pub struct PickArgs {
	/// Scene description (JSON)
	#[arg(value_name = "SCENE")]
	pub scene: PathBuf,

	/// X coordinate in CSS pixels
	#[arg(long, allow_negative_numbers = true)]
	pub x: f64,

	/// Y coordinate in CSS pixels
	#[arg(long, allow_negative_numbers = true)]
	pub y: f64,
}

#[cfg(test)]
mod tests;
