//! Lazily created selection sessions keyed by purpose.
//!
//! Uses [`DashMap`] so operators on any task can look up or create their
//! session without a global lock. Sessions are never removed: they live as
//! long as the viewer and are reset between sweeps.

use std::sync::Arc;

use cadview_runtime::PickEngine;
use dashmap::DashMap;

use super::node_selection::NodeSelection;
use super::session::SelectionSession;
use crate::events::Dispatcher;

/// Per-viewer registry of [`SelectionSession`]s.
pub struct SessionRegistry {
	sessions: DashMap<Arc<str>, Arc<SelectionSession>>,
	engine: Arc<dyn PickEngine>,
	selection: NodeSelection,
	events: Dispatcher,
	predicate_concurrency: usize,
}

impl SessionRegistry {
	pub fn new(engine: Arc<dyn PickEngine>, selection: NodeSelection, events: Dispatcher, predicate_concurrency: usize) -> Self {
		Self {
			sessions: DashMap::new(),
			engine,
			selection,
			events,
			predicate_concurrency,
		}
	}

	/// Returns the session for `key`, creating it on first use.
	pub fn get_or_create(&self, key: &str) -> Arc<SelectionSession> {
		if let Some(session) = self.sessions.get(key) {
			return Arc::clone(session.value());
		}

		self.sessions
			.entry(Arc::from(key))
			.or_insert_with(|| {
				tracing::debug!(target = "cadview.session", key, "creating selection session");
				Arc::new(SelectionSession::new(
					key,
					Arc::clone(&self.engine),
					self.selection.clone(),
					self.events.clone(),
					self.predicate_concurrency,
				))
			})
			.value()
			.clone()
	}

	/// Synchronous lookup without creation.
	pub fn get(&self, key: &str) -> Option<Arc<SelectionSession>> {
		self.sessions.get(key).map(|r| Arc::clone(r.value()))
	}

	pub fn keys(&self) -> Vec<Arc<str>> {
		let mut keys: Vec<_> = self.sessions.iter().map(|r| Arc::clone(r.key())).collect();
		keys.sort();
		keys
	}

	/// True iff every registered session is idle.
	pub fn all_idle(&self) -> bool {
		self.sessions.iter().all(|r| r.value().is_idle())
	}
}

impl std::fmt::Debug for SessionRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SessionRegistry").field("keys", &self.keys()).finish()
	}
}
