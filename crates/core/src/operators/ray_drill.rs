//! Ray-drill selection: everything under the cursor, front to back.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use cadview_protocol::{BeginConfig, MouseButton, PickConfig, Point2};
use cadview_runtime::Result;
use parking_lot::Mutex;
use tracing::{debug, trace};

use super::hooks::SessionHooks;
use super::input::{Key, KeyInput, MouseInput};
use super::{GestureState, Operator, run_selection};
use crate::selection::{IdleTracker, SelectionPredicate, SelectionSession};
use crate::viewer::Viewer;

pub fn ray_drill_begin_config(base: &PickConfig, origin: Point2, box_radius: f64) -> BeginConfig {
	BeginConfig::ray_drill(*base, origin, box_radius)
}

#[derive(Debug, Clone, Copy)]
enum DrillGesture {
	Idle,
	Pressed(Point2),
	Performing(u64),
}

/// Drills through the scene at a click position.
///
/// A press and release further apart than the click threshold is a drag and
/// is left to other operators.
pub struct RayDrillSelectOperator {
	viewer: Viewer,
	session: Arc<SelectionSession>,
	gesture: Mutex<DrillGesture>,
	ignore_transparency: AtomicBool,
	releases: AtomicU64,
	_hooks: SessionHooks,
}

impl RayDrillSelectOperator {
	pub const NAME: &'static str = "ray-drill-select";

	pub fn new(viewer: &Viewer) -> Self {
		let session = viewer.selection_session();
		let hooks = SessionHooks::attach(viewer.events(), &session);
		Self {
			viewer: viewer.clone(),
			session,
			gesture: Mutex::new(DrillGesture::Idle),
			ignore_transparency: AtomicBool::new(viewer.config().ignore_transparency),
			releases: AtomicU64::new(0),
			_hooks: hooks,
		}
	}

	/// When set, nodes with opacity below one are dropped from results.
	pub fn set_ignore_transparency(&self, ignore: bool) {
		self.ignore_transparency.store(ignore, Ordering::Relaxed);
	}

	pub fn ignore_transparency(&self) -> bool {
		self.ignore_transparency.load(Ordering::Relaxed)
	}

	pub fn state(&self) -> GestureState {
		match *self.gesture.lock() {
			DrillGesture::Idle => GestureState::Idle,
			DrillGesture::Pressed(_) => GestureState::Dragging,
			DrillGesture::Performing(_) => GestureState::Performing,
		}
	}

	pub fn idle_tracker(&self) -> IdleTracker {
		IdleTracker::new(Arc::clone(&self.session))
	}
}

#[async_trait]
impl Operator for RayDrillSelectOperator {
	fn name(&self) -> &'static str {
		Self::NAME
	}

	async fn on_mouse_down(&self, input: &mut MouseInput) -> Result<()> {
		if input.button == MouseButton::Left {
			*self.gesture.lock() = DrillGesture::Pressed(input.position);
		}
		Ok(())
	}

	async fn on_mouse_up(&self, input: &mut MouseInput) -> Result<()> {
		if input.button != MouseButton::Left {
			return Ok(());
		}

		let release = self.releases.fetch_add(1, Ordering::Relaxed);
		let origin = {
			let mut gesture = self.gesture.lock();
			let DrillGesture::Pressed(press) = *gesture else {
				return Ok(());
			};
			let distance_sq = press.distance_squared(input.position);
			if distance_sq > self.viewer.config().click_threshold_sq {
				trace!(target = "cadview.operator", operator = Self::NAME, distance_sq, "release too far from press");
				*gesture = DrillGesture::Idle;
				return Ok(());
			}
			*gesture = DrillGesture::Performing(release);
			press
		};
		input.set_handled();

		// The ray starts where the button went down.
		let config = self.viewer.config();
		let begin = ray_drill_begin_config(&config.pick, origin, config.ray_box_radius);
		let predicate = self
			.ignore_transparency()
			.then(|| SelectionPredicate::exclude_transparent(Arc::clone(self.viewer.engine())));
		let additive = input.modifiers.is_down(config.additive_modifier);

		let outcome = run_selection(&self.session, additive, begin, predicate).await;

		{
			let mut gesture = self.gesture.lock();
			if matches!(*gesture, DrillGesture::Performing(r) if r == release) {
				*gesture = DrillGesture::Idle;
			}
		}

		if let Some(summary) = outcome? {
			debug!(
				target = "cadview.operator",
				operator = Self::NAME,
				additive,
				candidates = summary.candidates,
				accepted = summary.accepted,
				"ray drill complete"
			);
		}
		Ok(())
	}

	async fn on_key_down(&self, input: &mut KeyInput) -> Result<()> {
		if input.key != Key::Escape {
			return Ok(());
		}
		{
			let mut gesture = self.gesture.lock();
			if matches!(*gesture, DrillGesture::Pressed(_)) {
				*gesture = DrillGesture::Idle;
			}
		}
		input.set_handled();

		let session = Arc::clone(&self.session);
		self.viewer.tasks().spawn("ray-drill-select.escape", async move {
			session.clear_selection().await;
			Ok(())
		});
		Ok(())
	}

	fn on_deactivate(&self) {
		let mut gesture = self.gesture.lock();
		if matches!(*gesture, DrillGesture::Pressed(_)) {
			*gesture = DrillGesture::Idle;
		}
	}
}

impl std::fmt::Debug for RayDrillSelectOperator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RayDrillSelectOperator")
			.field("gesture", &*self.gesture.lock())
			.field("ignore_transparency", &self.ignore_transparency())
			.finish()
	}
}
