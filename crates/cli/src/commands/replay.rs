//! `cadview replay`: drives an operator chain from a gesture script.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use cadview::{
	AreaSelectOperator, ClickSelectOperator, EventKind, Key, KeyInput, MouseInput, OperatorChain, RayDrillSelectOperator,
	Subscription, Viewer,
};
use cadview_protocol::{MouseButton, SelectionItem};
use cadview_runtime::{EngineStats, SceneEngine};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::resolve_config;
use crate::error::{CliError, Result};
use crate::script::{Action, OperatorKind, Script};

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTally {
	pub selection_arrays: usize,
	pub batch_ends: usize,
	pub resets: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
	pub actions: usize,
	pub selection: Vec<SelectionItem>,
	pub generation: u64,
	pub events: EventTally,
	pub engine: EngineStats,
}

/// Counts viewer events while alive.
struct Tally {
	counters: Arc<[AtomicUsize; 3]>,
	_subscriptions: Vec<Subscription>,
}

impl Tally {
	fn attach(viewer: &Viewer) -> Self {
		let counters: Arc<[AtomicUsize; 3]> = Arc::new(Default::default());
		let subscriptions = [EventKind::SelectionArray, EventKind::SelectionBatchEnd, EventKind::ResetAssemblyTreeEnd]
			.into_iter()
			.enumerate()
			.map(|(slot, kind)| {
				let counters = Arc::clone(&counters);
				viewer.events().on(kind, move |_| {
					counters[slot].fetch_add(1, Ordering::Relaxed);
					async { Ok(()) }
				})
			})
			.collect();
		Self {
			counters,
			_subscriptions: subscriptions,
		}
	}

	fn snapshot(&self) -> EventTally {
		let [arrays, batch_ends, resets] = &*self.counters;
		EventTally {
			selection_arrays: arrays.load(Ordering::Relaxed),
			batch_ends: batch_ends.load(Ordering::Relaxed),
			resets: resets.load(Ordering::Relaxed),
		}
	}
}

/// Release running in the background.
struct Detached {
	index: usize,
	action: &'static str,
	handle: JoinHandle<cadview::Result<()>>,
}

struct Replay {
	viewer: Viewer,
	chain: Arc<OperatorChain>,
	drill: Option<Arc<RayDrillSelectOperator>>,
	detached: Vec<Detached>,
}

impl Replay {
	fn new(viewer: Viewer, kinds: &[OperatorKind]) -> Self {
		let mut chain = OperatorChain::new();
		let mut drill = None;
		for (rank, kind) in kinds.iter().enumerate() {
			let priority = i32::try_from(kinds.len() - rank).unwrap_or(i32::MAX);
			match kind {
				OperatorKind::Area => chain.push(priority, Arc::new(AreaSelectOperator::new(&viewer))),
				OperatorKind::RayDrill => {
					let op = Arc::new(RayDrillSelectOperator::new(&viewer));
					drill = Some(Arc::clone(&op));
					chain.push(priority, op);
				}
				OperatorKind::Click => chain.push(priority, Arc::new(ClickSelectOperator::new(&viewer))),
			}
		}
		debug!(target = "cadview.cli", operators = ?chain.names(), "operator chain ready");

		Self {
			viewer,
			chain: Arc::new(chain),
			drill,
			detached: Vec::new(),
		}
	}

	async fn release(&mut self, index: usize, action: &'static str, mut input: MouseInput, detach: bool) -> cadview::Result<()> {
		if !detach {
			return self.chain.mouse_up(&mut input).await;
		}
		let chain = Arc::clone(&self.chain);
		let handle = tokio::spawn(async move { chain.mouse_up(&mut input).await });
		self.detached.push(Detached { index, action, handle });
		// On the current-thread runtime this lets the release claim its
		// gesture before the next scripted press arrives.
		tokio::task::yield_now().await;
		Ok(())
	}

	async fn step(&mut self, index: usize, action: Action) -> Result<()> {
		let name = action.name();
		if action == Action::WaitForIdle {
			self.join_detached().await?;
		}
		self.apply(index, action)
			.await
			.map_err(|source| CliError::Action { index, action: name, source })
	}

	async fn apply(&mut self, index: usize, action: Action) -> cadview::Result<()> {
		let name = action.name();
		match action {
			Action::MouseDown { at, button, modifiers } => {
				self.chain.mouse_down(&mut MouseInput::new(at, button, modifiers)).await
			}
			Action::MouseMove { at, modifiers } => {
				self.chain.mouse_move(&mut MouseInput::new(at, MouseButton::Left, modifiers)).await
			}
			Action::MouseUp {
				at,
				button,
				modifiers,
				detach,
			} => self.release(index, name, MouseInput::new(at, button, modifiers), detach).await,
			Action::Drag {
				from,
				to,
				modifiers,
				detach,
			} => {
				self.chain.mouse_down(&mut MouseInput::new(from, MouseButton::Left, modifiers)).await?;
				self.chain.mouse_move(&mut MouseInput::new(to, MouseButton::Left, modifiers)).await?;
				self.release(index, name, MouseInput::new(to, MouseButton::Left, modifiers), detach).await
			}
			Action::Click { at, modifiers, detach } => {
				self.chain.mouse_down(&mut MouseInput::new(at, MouseButton::Left, modifiers)).await?;
				self.release(index, name, MouseInput::new(at, MouseButton::Left, modifiers), detach).await
			}
			Action::Key { key, modifiers } => self.chain.key_down(&mut KeyInput::new(Key::from_dom(&key), modifiers)).await,
			Action::Reset => self.viewer.reset_assembly_tree(|| async { Ok(()) }).await,
			Action::Clear => {
				self.viewer.selection_session().clear_selection().await;
				Ok(())
			}
			Action::WaitForIdle => {
				self.quiesce().await;
				Ok(())
			}
			Action::SetIgnoreTransparency { value } => match &self.drill {
				Some(drill) => {
					drill.set_ignore_transparency(value);
					Ok(())
				}
				None => Err(cadview::Error::InvalidArgument("no rayDrill operator installed".to_string())),
			},
			Action::Sleep { ms } => {
				tokio::time::sleep(Duration::from_millis(ms)).await;
				Ok(())
			}
		}
	}

	/// Awaits every detached release, reporting the first failure against
	/// the action that started it.
	async fn join_detached(&mut self) -> Result<()> {
		for detached in std::mem::take(&mut self.detached) {
			detached.handle.await?.map_err(|source| CliError::Action {
				index: detached.index,
				action: detached.action,
				source,
			})?;
		}
		Ok(())
	}

	/// Waits for spawned tasks (escape clears) and the session to settle.
	async fn quiesce(&self) {
		self.viewer.tasks().wait_for_tasks().await;
		self.viewer.idle_tracker().wait_for_idle().await;
	}
}

/// Replays the script at `path` and reports the final selection.
pub async fn run(path: &Path, config: Option<&Path>) -> Result<ReplayReport> {
	let script = Script::load(path)?;
	let base = path.parent().unwrap_or_else(|| Path::new("."));
	let engine = Arc::new(script.scene.load(base)?);
	let config = resolve_config(config, script.config.clone())?;
	let viewer = Viewer::new(Arc::<SceneEngine>::clone(&engine), config);
	let tally = Tally::attach(&viewer);

	let mut replay = Replay::new(viewer.clone(), &script.operators);
	let actions = script.actions.len();
	for (index, action) in script.actions.into_iter().enumerate() {
		debug!(target = "cadview.cli", index, action = action.name(), "step");
		replay.step(index, action).await?;
	}
	replay.join_detached().await?;
	replay.quiesce().await;

	let report = ReplayReport {
		actions,
		selection: viewer.selection().snapshot(),
		generation: viewer.selection_session().generation(),
		events: tally.snapshot(),
		engine: engine.stats(),
	};
	info!(
		target = "cadview.cli",
		actions,
		selected = report.selection.len(),
		sweeps = report.engine.sweeps_begun,
		"replay finished"
	);
	Ok(report)
}
