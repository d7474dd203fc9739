//! Handler table behind [`Dispatcher`](crate::Dispatcher) and the
//! [`Subscription`] handles it gives out.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use cadview_runtime::Result;
use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::events::{EventKind, ViewerEvent};

/// Process-unique handler identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

impl HandlerId {
	fn next() -> Self {
		static NEXT: AtomicU64 = AtomicU64::new(1);
		HandlerId(NEXT.fetch_add(1, Ordering::Relaxed))
	}
}

impl std::fmt::Display for HandlerId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "handler#{}", self.0)
	}
}

pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

pub(crate) type ViewerHandler = Arc<dyn Fn(ViewerEvent) -> HandlerFuture + Send + Sync>;

/// Registered handlers in registration order.
#[derive(Default)]
pub(crate) struct HandlerTable {
	entries: Mutex<IndexMap<HandlerId, (EventKind, ViewerHandler)>>,
}

impl HandlerTable {
	pub(crate) fn insert(&self, kind: EventKind, handler: ViewerHandler) -> HandlerId {
		let id = HandlerId::next();
		self.entries.lock().insert(id, (kind, handler));
		id
	}

	fn remove(&self, id: HandlerId) -> bool {
		// shift_remove keeps the remaining handlers in registration order.
		self.entries.lock().shift_remove(&id).is_some()
	}

	/// Snapshot of the handlers for `kind`, so none run under the lock.
	pub(crate) fn matching(&self, kind: EventKind) -> Vec<(HandlerId, ViewerHandler)> {
		self.entries
			.lock()
			.iter()
			.filter(|(_, (k, _))| *k == kind)
			.map(|(id, (_, handler))| (*id, Arc::clone(handler)))
			.collect()
	}

	pub(crate) fn count(&self, kind: EventKind) -> usize {
		self.entries.lock().values().filter(|(k, _)| *k == kind).count()
	}

	pub(crate) fn len(&self) -> usize {
		self.entries.lock().len()
	}
}

/// Unregisters its handler when dropped.
///
/// Holds the table weakly: dropping after every dispatcher clone is gone is
/// a no-op.
#[must_use = "dropping a Subscription unregisters the handler immediately"]
pub struct Subscription {
	id: HandlerId,
	table: Weak<HandlerTable>,
}

impl Subscription {
	pub(crate) fn new(id: HandlerId, table: &Arc<HandlerTable>) -> Self {
		Self {
			id,
			table: Arc::downgrade(table),
		}
	}

	pub fn id(&self) -> HandlerId {
		self.id
	}

	/// True while the handler is still registered.
	pub fn is_active(&self) -> bool {
		self.table
			.upgrade()
			.is_some_and(|table| table.entries.lock().contains_key(&self.id))
	}

	/// Same as dropping; reads better at call sites that unsubscribe early.
	pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		if let Some(table) = self.table.upgrade() {
			table.remove(self.id);
		}
	}
}

impl std::fmt::Debug for Subscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Subscription").field("id", &self.id).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn noop() -> ViewerHandler {
		Arc::new(|_| Box::pin(async { Ok(()) }))
	}

	#[test]
	fn ids_are_unique_and_increasing() {
		let table = HandlerTable::default();
		let a = table.insert(EventKind::SelectionArray, noop());
		let b = table.insert(EventKind::SelectionArray, noop());
		assert!(b > a);
		assert_eq!(table.len(), 2);
	}

	#[test]
	fn dropping_subscription_removes_only_its_handler() {
		let table = Arc::new(HandlerTable::default());
		let first = Subscription::new(table.insert(EventKind::ResetAssemblyTreeBegin, noop()), &table);
		let second = Subscription::new(table.insert(EventKind::ResetAssemblyTreeBegin, noop()), &table);

		drop(first);

		assert_eq!(table.count(EventKind::ResetAssemblyTreeBegin), 1);
		assert!(second.is_active());
		assert_eq!(table.matching(EventKind::ResetAssemblyTreeBegin)[0].0, second.id());
	}

	#[test]
	fn subscription_may_outlive_table() {
		let table = Arc::new(HandlerTable::default());
		let sub = Subscription::new(table.insert(EventKind::SelectionBatchEnd, noop()), &table);
		drop(table);

		assert!(!sub.is_active());
		drop(sub);
	}
}
