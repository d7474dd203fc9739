//! Rubber-band area selection.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use cadview_protocol::{BeginConfig, MouseButton, PickConfig, Point2};
use cadview_runtime::Result;
use parking_lot::Mutex;
use tracing::debug;

use super::hooks::SessionHooks;
use super::input::{Key, KeyInput, MouseInput};
use super::{GestureState, Operator, run_selection};
use crate::selection::{IdleTracker, SelectionSession};
use crate::viewer::Viewer;

/// Normalizes two drag corners into `(min, max)`.
pub fn selection_rect(initial: Point2, current: Point2) -> (Point2, Point2) {
	(initial.min(current), initial.max(current))
}

/// True when the drag spans a non-empty rectangle.
pub fn allow_selection(initial: Point2, current: Point2) -> bool {
	let (min, max) = selection_rect(initial, current);
	min.is_finite() && max.is_finite() && max.x > min.x && max.y > min.y
}

/// Builds the sweep for a drag from `initial` to `current`.
///
/// Dragging left to right selects only fully contained nodes; right to left
/// selects anything the rectangle touches. Returns `None` for a degenerate
/// rectangle.
pub fn area_begin_config(base: &PickConfig, initial: Point2, current: Point2) -> Option<BeginConfig> {
	if !allow_selection(initial, current) {
		return None;
	}
	let pick = base.must_be_fully_contained(initial.x < current.x);
	Some(BeginConfig::screen_by_area(pick, initial, current))
}

#[derive(Debug, Clone, Copy)]
enum AreaGesture {
	Idle,
	Dragging { initial: Point2, current: Point2 },
	/// Tagged so an older release finishing late leaves a newer one alone.
	Performing(u64),
}

/// Selects every node inside a dragged rectangle.
pub struct AreaSelectOperator {
	viewer: Viewer,
	session: Arc<SelectionSession>,
	gesture: Mutex<AreaGesture>,
	releases: AtomicU64,
	_hooks: SessionHooks,
}

impl AreaSelectOperator {
	pub const NAME: &'static str = "area-select";

	pub fn new(viewer: &Viewer) -> Self {
		let session = viewer.selection_session();
		let hooks = SessionHooks::attach(viewer.events(), &session);
		Self {
			viewer: viewer.clone(),
			session,
			gesture: Mutex::new(AreaGesture::Idle),
			releases: AtomicU64::new(0),
			_hooks: hooks,
		}
	}

	pub fn state(&self) -> GestureState {
		match *self.gesture.lock() {
			AreaGesture::Idle => GestureState::Idle,
			AreaGesture::Dragging { .. } => GestureState::Dragging,
			AreaGesture::Performing(_) => GestureState::Performing,
		}
	}

	/// Rectangle being dragged, for drawing the rubber band.
	pub fn rect(&self) -> Option<(Point2, Point2)> {
		match *self.gesture.lock() {
			AreaGesture::Dragging { initial, current } => Some(selection_rect(initial, current)),
			_ => None,
		}
	}

	pub fn idle_tracker(&self) -> IdleTracker {
		IdleTracker::new(Arc::clone(&self.session))
	}

	fn cancel_drag(&self, reason: &'static str) {
		let mut gesture = self.gesture.lock();
		if matches!(*gesture, AreaGesture::Dragging { .. }) {
			debug!(target = "cadview.operator", operator = Self::NAME, reason, "drag cancelled");
			*gesture = AreaGesture::Idle;
		}
	}
}

#[async_trait]
impl Operator for AreaSelectOperator {
	fn name(&self) -> &'static str {
		Self::NAME
	}

	async fn on_mouse_down(&self, input: &mut MouseInput) -> Result<()> {
		if input.button != MouseButton::Left {
			return Ok(());
		}
		*self.gesture.lock() = AreaGesture::Dragging {
			initial: input.position,
			current: input.position,
		};
		Ok(())
	}

	async fn on_mouse_move(&self, input: &mut MouseInput) -> Result<()> {
		if let AreaGesture::Dragging { current, .. } = &mut *self.gesture.lock() {
			*current = input.position;
		}
		Ok(())
	}

	async fn on_mouse_up(&self, input: &mut MouseInput) -> Result<()> {
		if input.button != MouseButton::Left {
			return Ok(());
		}

		let release = self.releases.fetch_add(1, Ordering::Relaxed);
		let config = {
			let mut gesture = self.gesture.lock();
			let AreaGesture::Dragging { initial, .. } = *gesture else {
				return Ok(());
			};
			match area_begin_config(&self.viewer.config().pick, initial, input.position) {
				Some(config) => {
					*gesture = AreaGesture::Performing(release);
					config
				}
				None => {
					*gesture = AreaGesture::Idle;
					return Ok(());
				}
			}
		};
		input.set_handled();

		let additive = input.modifiers.is_down(self.viewer.config().additive_modifier);
		let outcome = run_selection(&self.session, additive, config, None).await;

		{
			let mut gesture = self.gesture.lock();
			if matches!(*gesture, AreaGesture::Performing(r) if r == release) {
				*gesture = AreaGesture::Idle;
			}
		}

		if let Some(summary) = outcome? {
			debug!(
				target = "cadview.operator",
				operator = Self::NAME,
				additive,
				accepted = summary.accepted,
				"area selection complete"
			);
		}
		Ok(())
	}

	async fn on_key_down(&self, input: &mut KeyInput) -> Result<()> {
		if input.key != Key::Escape {
			return Ok(());
		}
		self.cancel_drag("escape");
		input.set_handled();

		let session = Arc::clone(&self.session);
		self.viewer.tasks().spawn("area-select.escape", async move {
			session.clear_selection().await;
			Ok(())
		});
		Ok(())
	}

	fn on_deactivate(&self) {
		self.cancel_drag("deactivated");
	}
}

impl std::fmt::Debug for AreaSelectOperator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AreaSelectOperator")
			.field("gesture", &*self.gesture.lock())
			.field("session", &self.session.key())
			.finish()
	}
}
