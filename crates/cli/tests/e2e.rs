//! End-to-end runs of the `cadview` binary.

use std::path::Path;
use std::process::Command;

use serde_json::json;
use tempfile::TempDir;

fn run(args: &[&str], cwd: &Path) -> (bool, serde_json::Value, String) {
	let output = Command::new(env!("CARGO_BIN_EXE_cadview"))
		.current_dir(cwd)
		.env_remove("RUST_LOG")
		.args(args)
		.output()
		.expect("failed to execute cadview");

	let stdout = String::from_utf8_lossy(&output.stdout).to_string();
	let stderr = String::from_utf8_lossy(&output.stderr).to_string();
	let parsed = serde_json::from_str::<serde_json::Value>(&stdout).unwrap_or_else(|_| json!({ "raw": stdout }));
	(output.status.success(), parsed, stderr)
}

fn write_scene(dir: &TempDir) {
	let scene = json!({
		"nodes": [
			{ "id": 7, "min": { "x": 0, "y": 0 }, "max": { "x": 100, "y": 100 }, "depth": 5 },
			{ "id": 8, "min": { "x": 50, "y": 50 }, "max": { "x": 150, "y": 150 }, "depth": 1 },
			{ "id": 9, "min": { "x": 60, "y": 60 }, "max": { "x": 70, "y": 70 }, "visible": false }
		]
	});
	std::fs::write(dir.path().join("scene.json"), scene.to_string()).unwrap();
}

#[test]
fn pick_returns_front_most_hit() {
	let dir = TempDir::new().unwrap();
	write_scene(&dir);

	let (ok, out, stderr) = run(&["pick", "scene.json", "--x", "65", "--y", "65"], dir.path());

	assert!(ok, "pick failed: {stderr}");
	assert_eq!(out["ok"], true);
	assert_eq!(out["command"], "pick");
	assert_eq!(out["data"]["hit"]["nodeId"], 8);
}

#[test]
fn pick_miss_is_null() {
	let dir = TempDir::new().unwrap();
	write_scene(&dir);

	let (ok, out, _) = run(&["pick", "scene.json", "--x", "500", "--y", "500"], dir.path());

	assert!(ok);
	assert!(out["data"]["hit"].is_null());
}

#[test]
fn replay_drag_prints_selection() {
	let dir = TempDir::new().unwrap();
	write_scene(&dir);
	let script = json!({
		"scene": "scene.json",
		"actions": [
			{ "type": "drag", "from": { "x": -5, "y": -5 }, "to": { "x": 105, "y": 105 } }
		]
	});
	std::fs::write(dir.path().join("gestures.json"), script.to_string()).unwrap();

	let (ok, out, stderr) = run(&["replay", "gestures.json"], dir.path());

	assert!(ok, "replay failed: {stderr}");
	let ids: Vec<u64> = out["data"]["selection"]
		.as_array()
		.unwrap()
		.iter()
		.map(|item| item["nodeId"].as_u64().unwrap())
		.collect();
	// Left-to-right drag: only fully contained, visible nodes.
	assert_eq!(ids, vec![7]);
	assert_eq!(out["data"]["engine"]["sweepsBegun"], 1);
}

#[test]
fn missing_script_fails_with_envelope() {
	let dir = TempDir::new().unwrap();

	let (ok, out, stderr) = run(&["replay", "absent.json"], dir.path());

	assert!(!ok);
	assert_eq!(out["ok"], false);
	assert_eq!(out["error"]["code"], "IO_ERROR");
	assert!(stderr.contains("absent.json"));
}

#[test]
fn invalid_config_is_invalid_input() {
	let dir = TempDir::new().unwrap();
	write_scene(&dir);
	std::fs::write(dir.path().join("viewer.json"), r#"{ "predicateConcurrency": 0 }"#).unwrap();

	let (ok, out, _) = run(&["pick", "scene.json", "--x", "1", "--y", "1", "--config", "viewer.json"], dir.path());

	assert!(!ok);
	assert_eq!(out["error"]["code"], "INVALID_INPUT");
}
