//! [`Viewer`]: the handle operators are constructed from.

use std::sync::Arc;

use cadview_protocol::{Point2, SelectionItem};
use cadview_runtime::{PickEngine, Result, TaskSpawner};

use crate::config::ViewerConfig;
use crate::events::{Dispatcher, ViewerEvent};
use crate::selection::{IdleTracker, NodeSelection, SelectionSession, SessionRegistry};

struct ViewerInner {
	engine: Arc<dyn PickEngine>,
	events: Dispatcher,
	selection: NodeSelection,
	sessions: SessionRegistry,
	tasks: TaskSpawner,
	config: ViewerConfig,
}

/// Interaction-side view of one engine instance. Cheap to clone.
#[derive(Clone)]
pub struct Viewer {
	inner: Arc<ViewerInner>,
}

impl Viewer {
	pub fn new(engine: Arc<dyn PickEngine>, config: ViewerConfig) -> Self {
		Self::with_tasks(engine, config, TaskSpawner::new())
	}

	/// Creates a viewer whose detached work reports to `tasks`' error sink.
	pub fn with_tasks(engine: Arc<dyn PickEngine>, config: ViewerConfig, tasks: TaskSpawner) -> Self {
		let events = Dispatcher::new();
		let selection = NodeSelection::new(events.clone());
		let sessions = SessionRegistry::new(Arc::clone(&engine), selection.clone(), events.clone(), config.predicate_concurrency);

		Self {
			inner: Arc::new(ViewerInner {
				engine,
				events,
				selection,
				sessions,
				tasks,
				config,
			}),
		}
	}

	pub fn engine(&self) -> &Arc<dyn PickEngine> {
		&self.inner.engine
	}

	pub fn events(&self) -> &Dispatcher {
		&self.inner.events
	}

	/// Current node selection.
	pub fn selection(&self) -> &NodeSelection {
		&self.inner.selection
	}

	pub fn config(&self) -> &ViewerConfig {
		&self.inner.config
	}

	pub fn tasks(&self) -> &TaskSpawner {
		&self.inner.tasks
	}

	pub fn sessions(&self) -> &SessionRegistry {
		&self.inner.sessions
	}

	/// Session for `key`, created on first use.
	pub fn session(&self, key: &str) -> Arc<SelectionSession> {
		self.inner.sessions.get_or_create(key)
	}

	/// Session used by the selection operators.
	pub fn selection_session(&self) -> Arc<SelectionSession> {
		self.session(&self.inner.config.selection_key)
	}

	pub fn idle_tracker(&self) -> IdleTracker {
		IdleTracker::new(self.selection_session())
	}

	/// True while the operators' session has a sweep in flight.
	pub fn has_active_selection(&self) -> bool {
		!self.selection_session().is_idle()
	}

	/// Picks the front-most node under `point` with the configured pick flags.
	pub async fn pick_from_point(&self, point: Point2) -> Result<Option<SelectionItem>> {
		self.inner.engine.pick_from_point(point, &self.inner.config.pick).await
	}

	/// Announces an assembly-tree rebuild.
	///
	/// Returns once every `ResetAssemblyTreeBegin` handler has run, so
	/// selection sessions are quiescent before `rebuild` starts.
	pub async fn reset_assembly_tree<F, Fut>(&self, rebuild: F) -> Result<()>
	where
		F: FnOnce() -> Fut,
		Fut: std::future::Future<Output = Result<()>>,
	{
		tracing::debug!(target = "cadview.viewer", "reset assembly tree");
		self.inner.events.emit(ViewerEvent::ResetAssemblyTreeBegin).await;
		let result = rebuild().await;
		self.inner.events.emit(ViewerEvent::ResetAssemblyTreeEnd).await;
		result
	}
}

impl std::fmt::Debug for Viewer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Viewer")
			.field("selection", &self.inner.selection)
			.field("sessions", &self.inner.sessions)
			.finish_non_exhaustive()
	}
}
