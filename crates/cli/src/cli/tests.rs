use std::path::PathBuf;

use clap::Parser;

use super::*;

#[test]
fn parse_replay_command() {
	let cli = Cli::try_parse_from(["cadview", "replay", "gestures.json"]).unwrap();

	match cli.command {
		Commands::Replay(args) => assert_eq!(args.script, PathBuf::from("gestures.json")),
		_ => panic!("Expected Replay command"),
	}
	assert_eq!(cli.verbose, 0);
	assert_eq!(cli.format, OutputFormat::Json);
	assert!(cli.config.is_none());
}

#[test]
fn parse_pick_command() {
	let cli = Cli::try_parse_from(["cadview", "pick", "scene.json", "--x", "100", "--y", "-4.5"]).unwrap();

	match cli.command {
		Commands::Pick(args) => {
			assert_eq!(args.scene, PathBuf::from("scene.json"));
			assert_eq!(args.x, 100.0);
			assert_eq!(args.y, -4.5);
		}
		_ => panic!("Expected Pick command"),
	}
}

#[test]
fn global_flags_after_subcommand() {
	let cli = Cli::try_parse_from(["cadview", "replay", "s.json", "-vv", "--config", "viewer.json", "-f", "text"]).unwrap();

	assert_eq!(cli.verbose, 2);
	assert_eq!(cli.config, Some(PathBuf::from("viewer.json")));
	assert_eq!(cli.format, OutputFormat::Text);
	assert_eq!(cli.command.name(), "replay");
}

#[test]
fn pick_requires_coordinates() {
	assert!(Cli::try_parse_from(["cadview", "pick", "scene.json", "--x", "1"]).is_err());
}
