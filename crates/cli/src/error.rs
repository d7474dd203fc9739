use std::path::PathBuf;

use thiserror::Error;

use crate::output::{CommandError, ErrorCode};

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	#[error("invalid script {}: {message}", .path.display())]
	Script { path: PathBuf, message: String },

	#[error("action #{index} ({action}) failed: {source}")]
	Action {
		index: usize,
		action: &'static str,
		#[source]
		source: cadview::Error,
	},

	#[error(transparent)]
	Viewer(#[from] cadview::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error("detached gesture panicked or was cancelled: {0}")]
	Join(#[from] tokio::task::JoinError),

	#[error(transparent)]
	Anyhow(#[from] anyhow::Error),
}

fn viewer_error_code(err: &cadview::Error) -> ErrorCode {
	match err {
		e if e.is_engine_failure() => ErrorCode::EngineError,
		cadview::Error::Io(_) => ErrorCode::IoError,
		cadview::Error::InvalidArgument(_) | cadview::Error::NodeNotFound(_) | cadview::Error::Config(_) | cadview::Error::Json(_) => {
			ErrorCode::InvalidInput
		}
		_ => ErrorCode::InternalError,
	}
}

/// Classifies an `anyhow` chain by its root cause.
fn anyhow_error_code(err: &anyhow::Error) -> ErrorCode {
	let root = err.root_cause();
	if root.downcast_ref::<std::io::Error>().is_some() {
		ErrorCode::IoError
	} else if root.downcast_ref::<serde_json::Error>().is_some() {
		ErrorCode::InvalidInput
	} else if let Some(viewer) = err.downcast_ref::<cadview::Error>() {
		viewer_error_code(viewer)
	} else {
		ErrorCode::InternalError
	}
}

impl CliError {
	pub fn to_command_error(&self) -> CommandError {
		let (code, details) = match self {
			CliError::Script { path, .. } => (ErrorCode::InvalidInput, Some(serde_json::json!({ "path": path }))),
			CliError::Action { index, action, source } => (
				viewer_error_code(source),
				Some(serde_json::json!({ "index": index, "action": action })),
			),
			CliError::Viewer(err) => (viewer_error_code(err), None),
			CliError::Io(_) => (ErrorCode::IoError, None),
			CliError::Json(_) => (ErrorCode::InvalidInput, None),
			CliError::Join(_) => (ErrorCode::InternalError, None),
			CliError::Anyhow(err) => (anyhow_error_code(err), None),
		};

		CommandError {
			code,
			message: self.message(),
			details,
		}
	}

	/// Display text including the `anyhow` context chain.
	fn message(&self) -> String {
		match self {
			CliError::Anyhow(err) => format!("{err:#}"),
			other => other.to_string(),
		}
	}
}

#[cfg(test)]
mod tests {
	use anyhow::Context;

	use super::*;

	#[test]
	fn engine_failures_get_engine_code() {
		let err = CliError::Action {
			index: 2,
			action: "drag",
			source: cadview::Error::Engine("lost context".into()),
		};
		let cmd = err.to_command_error();
		assert_eq!(cmd.code, ErrorCode::EngineError);
		assert_eq!(cmd.details.unwrap()["index"], 2);
		assert!(cmd.message.contains("lost context"));
	}

	#[test]
	fn anyhow_io_root_cause_is_io_error() {
		let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
		let err: CliError = Err::<(), _>(io).context("reading scene.json").unwrap_err().into();
		let cmd = err.to_command_error();
		assert_eq!(cmd.code, ErrorCode::IoError);
		assert_eq!(cmd.message, "reading scene.json: missing");
	}

	#[test]
	fn invalid_config_is_invalid_input() {
		let err = CliError::Viewer(cadview::Error::Config("predicateConcurrency must be at least 1".into()));
		assert_eq!(err.to_command_error().code, ErrorCode::InvalidInput);
	}
}
