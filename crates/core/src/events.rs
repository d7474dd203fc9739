//! Typed viewer events with multi-subscriber fan-out.
//!
//! [`Dispatcher`] replaces an ambient per-viewer callback registry: it is an
//! explicit object handed to every component that emits or observes viewer
//! events. Two consumption patterns are supported:
//!
//! 1. **Handlers**: [`Dispatcher::on`] registers an async handler for one
//!    [`EventKind`]. [`Dispatcher::emit`] awaits every matching handler in
//!    registration order before returning, so emitters can rely on handlers
//!    having run (the assembly-tree reset depends on this).
//! 2. **Streams**: [`Dispatcher::subscribe`] returns a broadcast receiver of
//!    every event, for passive observers that must not delay the emitter.

use std::future::Future;
use std::sync::Arc;

use cadview_protocol::SelectionItem;
use cadview_runtime::Result;
use tokio::sync::broadcast;

use crate::handlers::{HandlerFuture, HandlerTable, Subscription, ViewerHandler};

/// Broadcast capacity for stream subscribers.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Event published by the viewer.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
	/// Node selection changed. Carries the items added by the change, or an
	/// empty array when the selection was cleared.
	SelectionArray(Vec<SelectionItem>),
	/// A selection sweep drained to completion.
	SelectionBatchEnd {
		key: Arc<str>,
		generation: u64,
		accepted: usize,
	},
	/// The assembly tree is about to be rebuilt.
	ResetAssemblyTreeBegin,
	/// The assembly tree rebuild finished.
	ResetAssemblyTreeEnd,
}

/// Discriminant of [`ViewerEvent`], used as the handler registration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
	SelectionArray,
	SelectionBatchEnd,
	ResetAssemblyTreeBegin,
	ResetAssemblyTreeEnd,
}

impl ViewerEvent {
	pub fn kind(&self) -> EventKind {
		match self {
			Self::SelectionArray(_) => EventKind::SelectionArray,
			Self::SelectionBatchEnd { .. } => EventKind::SelectionBatchEnd,
			Self::ResetAssemblyTreeBegin => EventKind::ResetAssemblyTreeBegin,
			Self::ResetAssemblyTreeEnd => EventKind::ResetAssemblyTreeEnd,
		}
	}
}

impl std::fmt::Display for EventKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::SelectionArray => write!(f, "selectionArray"),
			Self::SelectionBatchEnd => write!(f, "selectionBatchEnd"),
			Self::ResetAssemblyTreeBegin => write!(f, "resetAssemblyTreeBegin"),
			Self::ResetAssemblyTreeEnd => write!(f, "resetAssemblyTreeEnd"),
		}
	}
}

/// Viewer event dispatcher. Cheap to clone; clones share handlers.
#[derive(Clone)]
pub struct Dispatcher {
	handlers: Arc<HandlerTable>,
	tx: broadcast::Sender<ViewerEvent>,
}

impl Default for Dispatcher {
	fn default() -> Self {
		Self::new()
	}
}

impl Dispatcher {
	pub fn new() -> Self {
		let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
		Self {
			handlers: Arc::default(),
			tx,
		}
	}

	/// Registers an async handler for events of `kind`.
	///
	/// Returns a [`Subscription`] that unregisters the handler when dropped.
	pub fn on<F, Fut>(&self, kind: EventKind, handler: F) -> Subscription
	where
		F: Fn(ViewerEvent) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<()>> + Send + 'static,
	{
		let handler: ViewerHandler = Arc::new(move |event: ViewerEvent| -> HandlerFuture { Box::pin(handler(event)) });
		let id = self.handlers.insert(kind, handler);
		Subscription::new(id, &self.handlers)
	}

	/// Returns a broadcast receiver of every emitted event.
	pub fn subscribe(&self) -> broadcast::Receiver<ViewerEvent> {
		self.tx.subscribe()
	}

	/// Number of handlers registered for `kind`.
	pub fn handler_count(&self, kind: EventKind) -> usize {
		self.handlers.count(kind)
	}

	/// Dispatches `event` to every handler registered for its kind, then to
	/// stream subscribers.
	///
	/// Handler errors are logged and do not stop the fan-out.
	pub async fn emit(&self, event: ViewerEvent) {
		let kind = event.kind();
		for (id, handler) in self.handlers.matching(kind) {
			if let Err(e) = handler(event.clone()).await {
				tracing::error!(target = "cadview.events", error = %e, handler = %id, event = %kind, "viewer event handler failed");
			}
		}

		// No receivers is not an error.
		let _ = self.tx.send(event);
	}
}

impl std::fmt::Debug for Dispatcher {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Dispatcher")
			.field("handlers", &self.handlers.len())
			.field("subscribers", &self.tx.receiver_count())
			.finish()
	}
}
