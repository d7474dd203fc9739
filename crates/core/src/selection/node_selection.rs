//! The viewer's current node selection.

use std::sync::Arc;

use cadview_protocol::{NodeId, SelectionItem};
use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::events::{Dispatcher, ViewerEvent};

/// Ordered set of selected nodes. Clones share state.
///
/// Async mutators emit [`ViewerEvent::SelectionArray`] after the change.
/// The `*_silent` variants let a [`SelectionSession`](crate::SelectionSession)
/// apply a batch under its own lock and emit afterwards.
#[derive(Clone)]
pub struct NodeSelection {
	items: Arc<Mutex<IndexMap<NodeId, SelectionItem>>>,
	events: Dispatcher,
}

impl NodeSelection {
	pub fn new(events: Dispatcher) -> Self {
		Self {
			items: Arc::new(Mutex::new(IndexMap::new())),
			events,
		}
	}

	/// Selected items in selection order.
	pub fn snapshot(&self) -> Vec<SelectionItem> {
		self.items.lock().values().cloned().collect()
	}

	pub fn node_ids(&self) -> Vec<NodeId> {
		self.items.lock().keys().copied().collect()
	}

	pub fn len(&self) -> usize {
		self.items.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.lock().is_empty()
	}

	pub fn contains(&self, node: NodeId) -> bool {
		self.items.lock().contains_key(&node)
	}

	/// Adds `items`, returning those that were not already selected.
	pub(crate) fn insert_silent(&self, items: Vec<SelectionItem>) -> Vec<SelectionItem> {
		let mut map = self.items.lock();
		items
			.into_iter()
			.filter(|item| {
				if map.contains_key(&item.node_id) {
					false
				} else {
					map.insert(item.node_id, item.clone());
					true
				}
			})
			.collect()
	}

	/// Removes everything, returning whether anything was selected.
	pub(crate) fn clear_silent(&self) -> bool {
		let mut map = self.items.lock();
		let had_items = !map.is_empty();
		map.clear();
		had_items
	}

	/// Adds `items` and announces the newly selected ones.
	pub async fn add(&self, items: Vec<SelectionItem>) -> Vec<SelectionItem> {
		let added = self.insert_silent(items);
		if !added.is_empty() {
			self.events.emit(ViewerEvent::SelectionArray(added.clone())).await;
		}
		added
	}

	/// Clears the selection and announces an empty array if it changed.
	pub async fn clear(&self) {
		if self.clear_silent() {
			self.events.emit(ViewerEvent::SelectionArray(Vec::new())).await;
		}
	}

	/// Replaces the selection with `items`.
	pub async fn replace(&self, items: Vec<SelectionItem>) {
		let had_items = self.clear_silent();
		let added = self.insert_silent(items);
		if !added.is_empty() {
			self.events.emit(ViewerEvent::SelectionArray(added)).await;
		} else if had_items {
			self.events.emit(ViewerEvent::SelectionArray(Vec::new())).await;
		}
	}

	/// Adds `item` if absent, removes it otherwise. Returns true if it is now selected.
	pub async fn toggle(&self, item: SelectionItem) -> bool {
		let (selected, now_empty) = {
			let mut map = self.items.lock();
			if map.shift_remove(&item.node_id).is_some() {
				(false, map.is_empty())
			} else {
				map.insert(item.node_id, item.clone());
				(true, false)
			}
		};

		if selected {
			self.events.emit(ViewerEvent::SelectionArray(vec![item])).await;
		} else if now_empty {
			self.events.emit(ViewerEvent::SelectionArray(Vec::new())).await;
		}
		selected
	}
}

impl std::fmt::Debug for NodeSelection {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("NodeSelection").field("len", &self.len()).finish()
	}
}
