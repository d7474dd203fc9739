//! Viewer event hooks that keep a selection session consistent.

use std::sync::{Arc, Weak};

use crate::events::{Dispatcher, EventKind, ViewerEvent};
use crate::handlers::Subscription;
use crate::selection::SelectionSession;

/// Event subscriptions an operator holds for its session.
///
/// - `ResetAssemblyTreeBegin`: clears the selection and waits for every sweep
///   to settle, so the emitter only rebuilds once the session is quiescent.
/// - `SelectionArray` with no items: stops any sweep in flight.
///
/// Handlers hold the session weakly. Dropping the hooks unregisters them.
#[derive(Debug)]
pub struct SessionHooks {
	_reset: Subscription,
	_emptied: Subscription,
}

impl SessionHooks {
	pub fn attach(events: &Dispatcher, session: &Arc<SelectionSession>) -> Self {
		let weak = Arc::downgrade(session);
		let reset = events.on(EventKind::ResetAssemblyTreeBegin, move |_| {
			let session = Weak::upgrade(&weak);
			async move {
				if let Some(session) = session {
					tracing::debug!(target = "cadview.operator", key = session.key(), "reset: clearing selection");
					session.clear_selection().await;
					session.wait_for_idle().await;
				}
				Ok(())
			}
		});

		let weak = Arc::downgrade(session);
		let emptied = events.on(EventKind::SelectionArray, move |event| {
			let session = Weak::upgrade(&weak);
			async move {
				match (session, event) {
					(Some(session), ViewerEvent::SelectionArray(items)) if items.is_empty() => session.stop_selection().await,
					_ => {}
				}
				Ok(())
			}
		});

		Self {
			_reset: reset,
			_emptied: emptied,
		}
	}
}
