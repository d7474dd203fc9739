//! Result envelope printed on stdout.
//!
//! ```json
//! {
//!   "schemaVersion": 1,
//!   "ok": true,
//!   "command": "replay",
//!   "data": { ... },
//!   "timings": { "durationMs": 12 }
//! }
//! ```
//!
//! On failure `data` is replaced by `error: { code, message, details? }`.

#[cfg(test)]
mod tests;

use std::io::{self, Write};
use std::time::Instant;

use colored::Colorize;
use serde::Serialize;

/// Bumped on breaking changes to the envelope.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
	/// Pretty JSON envelope
	#[default]
	Json,
	/// Single-line JSON envelope
	Compact,
	/// Human-readable summary
	Text,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<'a, T: Serialize> {
	pub schema_version: u32,
	pub ok: bool,
	pub command: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,
	pub timings: Timings,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
	pub code: ErrorCode,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Stable error codes for scripted callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	/// Script, scene, or config could not be parsed or is invalid
	InvalidInput,
	/// File could not be read
	IoError,
	/// The pick engine reported a failure
	EngineError,
	/// A detached task or join failed
	InternalError,
}

impl ErrorCode {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::InvalidInput => "INVALID_INPUT",
			Self::IoError => "IO_ERROR",
			Self::EngineError => "ENGINE_ERROR",
			Self::InternalError => "INTERNAL_ERROR",
		}
	}
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timings {
	pub duration_ms: u64,
}

/// Times one command and prints its envelope.
#[derive(Debug)]
pub struct Reporter {
	command: &'static str,
	format: OutputFormat,
	started: Instant,
}

impl Reporter {
	pub fn start(command: &'static str, format: OutputFormat) -> Self {
		Self {
			command,
			format,
			started: Instant::now(),
		}
	}

	pub fn command(&self) -> &'static str {
		self.command
	}

	fn timings(&self) -> Timings {
		let elapsed = self.started.elapsed().as_millis();
		Timings {
			duration_ms: u64::try_from(elapsed).unwrap_or(u64::MAX),
		}
	}

	pub fn success<T: Serialize>(&self, data: T) -> Envelope<'_, T> {
		Envelope {
			schema_version: SCHEMA_VERSION,
			ok: true,
			command: self.command,
			data: Some(data),
			error: None,
			timings: self.timings(),
		}
	}

	pub fn failure(&self, error: CommandError) -> Envelope<'_, ()> {
		Envelope {
			schema_version: SCHEMA_VERSION,
			ok: false,
			command: self.command,
			data: None,
			error: Some(error),
			timings: self.timings(),
		}
	}

	/// Prints the success envelope for `data`.
	pub fn report<T: Serialize>(&self, data: T) -> io::Result<()> {
		write_stdout(&render(&self.success(data), self.format)?)
	}

	/// Prints `error` to stderr, plus the failure envelope on stdout unless
	/// the format is text.
	pub fn report_error(&self, error: CommandError) -> io::Result<()> {
		eprintln!("{} {}", "error:".red().bold(), error.message);
		if self.format == OutputFormat::Text {
			return Ok(());
		}
		write_stdout(&render(&self.failure(error), self.format)?)
	}
}

fn write_stdout(rendered: &str) -> io::Result<()> {
	let mut stdout = io::stdout().lock();
	writeln!(stdout, "{rendered}")?;
	stdout.flush()
}

pub fn render<T: Serialize>(envelope: &Envelope<'_, T>, format: OutputFormat) -> serde_json::Result<String> {
	match format {
		OutputFormat::Json => serde_json::to_string_pretty(envelope),
		OutputFormat::Compact => serde_json::to_string(envelope),
		OutputFormat::Text => {
			let status = if envelope.ok { "ok".green().bold() } else { "failed".red().bold() };
			let mut out = format!("{} {} ({}ms)", envelope.command.cyan(), status, envelope.timings.duration_ms);
			if let Some(data) = &envelope.data {
				out.push('\n');
				out.push_str(&serde_json::to_string_pretty(data)?);
			}
			if let Some(error) = &envelope.error {
				out.push_str(&format!("\n{}: {}", error.code.as_str().red(), error.message));
			}
			Ok(out)
		}
	}
}
