//! Outcome of a selection sweep.

use std::sync::Arc;

use thiserror::Error;

/// Result type alias for selection sweeps.
pub type SelectionResult<T> = std::result::Result<T, SelectionError>;

/// Why a sweep did not complete.
#[derive(Debug, Error)]
pub enum SelectionError {
	/// A newer sweep, a clear, or a stop superseded this one. Expected and
	/// recoverable; callers treat it as a no-op.
	#[error("Selection invalidated: sweep {generation} of '{key}' was superseded")]
	Invalidated { key: Arc<str>, generation: u64 },

	/// Engine, predicate, or argument failure.
	#[error(transparent)]
	Failed(#[from] cadview_runtime::Error),
}

impl SelectionError {
	pub fn is_invalidated(&self) -> bool {
		matches!(self, SelectionError::Invalidated { .. })
	}
}

/// Operator-boundary handling of sweep results.
pub trait SelectionResultExt<T> {
	/// Maps [`SelectionError::Invalidated`] to `Ok(None)` and surfaces every
	/// other failure unchanged.
	fn ignore_invalidated(self) -> cadview_runtime::Result<Option<T>>;
}

impl<T> SelectionResultExt<T> for SelectionResult<T> {
	fn ignore_invalidated(self) -> cadview_runtime::Result<Option<T>> {
		match self {
			Ok(value) => Ok(Some(value)),
			Err(SelectionError::Invalidated { key, generation }) => {
				tracing::debug!(target = "cadview.session", %key, generation, "ignoring invalidated sweep");
				Ok(None)
			}
			Err(SelectionError::Failed(err)) => Err(err),
		}
	}
}
