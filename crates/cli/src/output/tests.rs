use serde_json::json;

use super::*;

fn parse(rendered: String) -> serde_json::Value {
	serde_json::from_str(&rendered).unwrap()
}

#[test]
fn success_envelope_shape() {
	let reporter = Reporter::start("pick", OutputFormat::Compact);
	let value = parse(render(&reporter.success(json!({ "hit": null })), OutputFormat::Compact).unwrap());

	assert_eq!(value["schemaVersion"], SCHEMA_VERSION);
	assert_eq!(value["ok"], true);
	assert_eq!(value["command"], "pick");
	assert!(value.get("error").is_none());
	assert!(value["timings"]["durationMs"].is_u64());
}

#[test]
fn failure_envelope_carries_code() {
	let reporter = Reporter::start("replay", OutputFormat::Json);
	let envelope = reporter.failure(CommandError {
		code: ErrorCode::InvalidInput,
		message: "bad script".into(),
		details: None,
	});
	let value = parse(render(&envelope, OutputFormat::Json).unwrap());

	assert_eq!(value["ok"], false);
	assert_eq!(value["error"]["code"], ErrorCode::InvalidInput.as_str());
	assert_eq!(value["error"]["message"], "bad script");
	assert!(value.get("data").is_none());
}

#[test]
fn text_format_mentions_command() {
	colored::control::set_override(false);
	let reporter = Reporter::start("pick", OutputFormat::Text);
	let text = render(&reporter.success(json!({ "hit": 3 })), OutputFormat::Text).unwrap();
	assert!(text.starts_with("pick ok"));
	assert!(text.contains("\"hit\": 3"));
}
