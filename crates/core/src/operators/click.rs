//! Single-node click selection through the engine's point pick.

use std::sync::Arc;

use async_trait::async_trait;
use cadview_protocol::{MouseButton, Point2};
use cadview_runtime::Result;
use parking_lot::Mutex;
use tracing::debug;

use super::Operator;
use super::input::MouseInput;
use crate::selection::SelectionSession;
use crate::viewer::Viewer;

/// Picks the front-most node under a click.
///
/// A hit replaces the selection, or toggles the node when the additive
/// modifier is held. A plain click on empty space clears the selection.
pub struct ClickSelectOperator {
	viewer: Viewer,
	session: Arc<SelectionSession>,
	press: Mutex<Option<Point2>>,
}

impl ClickSelectOperator {
	pub const NAME: &'static str = "click-select";

	pub fn new(viewer: &Viewer) -> Self {
		Self {
			viewer: viewer.clone(),
			session: viewer.selection_session(),
			press: Mutex::new(None),
		}
	}
}

#[async_trait]
impl Operator for ClickSelectOperator {
	fn name(&self) -> &'static str {
		Self::NAME
	}

	async fn on_mouse_down(&self, input: &mut MouseInput) -> Result<()> {
		if input.button == MouseButton::Left {
			*self.press.lock() = Some(input.position);
		}
		Ok(())
	}

	async fn on_mouse_up(&self, input: &mut MouseInput) -> Result<()> {
		if input.button != MouseButton::Left {
			return Ok(());
		}
		let Some(press) = self.press.lock().take() else {
			return Ok(());
		};
		if press.distance_squared(input.position) > self.viewer.config().click_threshold_sq {
			return Ok(());
		}
		input.set_handled();

		// A sweep finishing after the pick would overwrite it.
		self.session.stop_selection().await;

		let additive = input.modifiers.is_down(self.viewer.config().additive_modifier);
		let selection = self.viewer.selection();
		match self.viewer.pick_from_point(input.position).await? {
			Some(item) if additive => {
				let node = item.node_id;
				let selected = selection.toggle(item).await;
				debug!(target = "cadview.operator", operator = Self::NAME, %node, selected, "toggled");
			}
			Some(item) => {
				debug!(target = "cadview.operator", operator = Self::NAME, node = %item.node_id, "picked");
				selection.replace(vec![item]).await;
			}
			None if additive => {}
			None => selection.clear().await,
		}
		Ok(())
	}

	fn on_deactivate(&self) {
		self.press.lock().take();
	}
}

impl std::fmt::Debug for ClickSelectOperator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ClickSelectOperator").field("press", &*self.press.lock()).finish()
	}
}
