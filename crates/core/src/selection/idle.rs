//! Busy/idle view over a selection session.

use std::future::Future;
use std::sync::Arc;

use super::session::SelectionSession;

/// Derived busy state of one [`SelectionSession`]. Holds no state of its own.
#[derive(Clone, Debug)]
pub struct IdleTracker {
	session: Arc<SelectionSession>,
}

impl IdleTracker {
	pub fn new(session: Arc<SelectionSession>) -> Self {
		Self { session }
	}

	pub fn key(&self) -> &str {
		self.session.key()
	}

	/// True while a sweep is in flight.
	pub fn has_active_selection(&self) -> bool {
		!self.session.is_idle()
	}

	/// See [`SelectionSession::wait_for_idle`].
	pub fn wait_for_idle(&self) -> impl Future<Output = ()> + Send + '_ {
		self.session.wait_for_idle()
	}
}
