//! Interaction operators that drive selection sessions from user input.
//!
//! An [`Operator`] reacts to mouse and keyboard input. Operators are
//! stacked in an [`OperatorChain`], which offers each input to them in
//! priority order until one marks it handled.
//!
//! ```text
//! input ──► OperatorChain ──► AreaSelectOperator ──┐
//!                        ├──► RayDrillSelectOperator ─┼──► SelectionSession ──► PickEngine
//!                        └──► ClickSelectOperator ───┘
//! ```

mod area;
mod click;
mod hooks;
mod input;
mod ray_drill;

use std::sync::Arc;

pub use area::{AreaSelectOperator, allow_selection, area_begin_config, selection_rect};
use async_trait::async_trait;
use cadview_protocol::BeginConfig;
use cadview_runtime::Result;
pub use click::ClickSelectOperator;
pub use hooks::SessionHooks;
pub use input::{Key, KeyInput, MouseInput};
pub use ray_drill::{RayDrillSelectOperator, ray_drill_begin_config};

use crate::selection::{SelectionPredicate, SelectionResultExt, SelectionSession, SweepSummary};

/// Gesture phase of an operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
	Idle,
	Dragging,
	Performing,
}

/// Input handler installed in an [`OperatorChain`].
///
/// Every callback defaults to doing nothing. Callbacks take `&self` so a
/// release can await its sweep while the next press is already delivered.
#[async_trait]
pub trait Operator: Send + Sync {
	fn name(&self) -> &'static str;

	async fn on_mouse_down(&self, _input: &mut MouseInput) -> Result<()> {
		Ok(())
	}

	async fn on_mouse_move(&self, _input: &mut MouseInput) -> Result<()> {
		Ok(())
	}

	async fn on_mouse_up(&self, _input: &mut MouseInput) -> Result<()> {
		Ok(())
	}

	async fn on_key_down(&self, _input: &mut KeyInput) -> Result<()> {
		Ok(())
	}

	fn on_activate(&self) {}

	fn on_deactivate(&self) {}
}

struct ChainEntry {
	priority: i32,
	operator: Arc<dyn Operator>,
}

/// Priority-ordered operator stack.
///
/// Higher priorities see input first. Operators with equal priority keep
/// insertion order.
#[derive(Default)]
pub struct OperatorChain {
	entries: Vec<ChainEntry>,
}

impl OperatorChain {
	pub fn new() -> Self {
		Self::default()
	}

	/// Installs and activates `operator`.
	pub fn push(&mut self, priority: i32, operator: Arc<dyn Operator>) {
		operator.on_activate();
		let at = self.entries.partition_point(|e| e.priority >= priority);
		self.entries.insert(at, ChainEntry { priority, operator });
	}

	/// Deactivates and removes the operator named `name`.
	pub fn remove(&mut self, name: &str) -> Option<Arc<dyn Operator>> {
		let at = self.entries.iter().position(|e| e.operator.name() == name)?;
		let entry = self.entries.remove(at);
		entry.operator.on_deactivate();
		Some(entry.operator)
	}

	pub fn names(&self) -> Vec<&'static str> {
		self.entries.iter().map(|e| e.operator.name()).collect()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub async fn mouse_down(&self, input: &mut MouseInput) -> Result<()> {
		for entry in &self.entries {
			entry.operator.on_mouse_down(input).await?;
			if input.handled() {
				break;
			}
		}
		Ok(())
	}

	pub async fn mouse_move(&self, input: &mut MouseInput) -> Result<()> {
		for entry in &self.entries {
			entry.operator.on_mouse_move(input).await?;
			if input.handled() {
				break;
			}
		}
		Ok(())
	}

	pub async fn mouse_up(&self, input: &mut MouseInput) -> Result<()> {
		for entry in &self.entries {
			entry.operator.on_mouse_up(input).await?;
			if input.handled() {
				break;
			}
		}
		Ok(())
	}

	pub async fn key_down(&self, input: &mut KeyInput) -> Result<()> {
		for entry in &self.entries {
			entry.operator.on_key_down(input).await?;
			if input.handled() {
				break;
			}
		}
		Ok(())
	}
}

impl Drop for OperatorChain {
	fn drop(&mut self) {
		for entry in &self.entries {
			entry.operator.on_deactivate();
		}
	}
}

impl std::fmt::Debug for OperatorChain {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("OperatorChain").field("operators", &self.names()).finish()
	}
}

/// Clears unless `additive`, then runs the sweep.
///
/// Returns `Ok(None)` when a later sweep, clear, or stop superseded this one.
pub(crate) async fn run_selection(
	session: &SelectionSession,
	additive: bool,
	config: BeginConfig,
	predicate: Option<SelectionPredicate>,
) -> Result<Option<SweepSummary>> {
	if !additive {
		session.clear_selection().await;
	}
	session.perform_selection(config, predicate).await.ignore_invalidated()
}

#[cfg(test)]
mod tests;
