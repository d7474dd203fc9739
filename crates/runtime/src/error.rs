//! Error types for the cadview runtime.

use cadview_protocol::{NodeId, RegionError};
use thiserror::Error;

use crate::engine::SweepId;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the engine contract and its callers.
#[derive(Debug, Error)]
pub enum Error {
	/// The engine failed while picking or streaming candidates.
	#[error("Engine error: {0}")]
	Engine(String),

	/// Invalid argument provided to a method.
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),

	/// The engine has no sweep with this handle.
	#[error("Selection sweep not found: {0}")]
	SweepNotFound(SweepId),

	/// The engine has no node with this id.
	#[error("Node not found: {0}")]
	NodeNotFound(NodeId),

	/// Configuration could not be loaded.
	#[error("Configuration error: {0}")]
	Config(String),

	/// I/O error.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl From<RegionError> for Error {
	fn from(err: RegionError) -> Self {
		Error::InvalidArgument(err.to_string())
	}
}

impl Error {
	/// Returns true if the failure originated inside the engine.
	pub fn is_engine_failure(&self) -> bool {
		matches!(self, Error::Engine(_) | Error::SweepNotFound(_))
	}

	/// Returns true if the caller passed an unusable argument.
	pub fn is_invalid_argument(&self) -> bool {
		matches!(self, Error::InvalidArgument(_))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn region_error_maps_to_invalid_argument() {
		let err: Error = RegionError::DegenerateArea.into();
		assert!(err.is_invalid_argument());
		assert_eq!(err.to_string(), "Invalid argument: selection area has zero width or height");
	}

	#[test]
	fn engine_failures_are_classified() {
		assert!(Error::Engine("stream reset".to_string()).is_engine_failure());
		assert!(Error::SweepNotFound(SweepId(3)).is_engine_failure());
		assert!(!Error::NodeNotFound(NodeId(3)).is_engine_failure());
		assert!(!Error::Config("bad radius".to_string()).is_engine_failure());
	}
}
