//! In-memory reference engine over screen-space node rectangles.
//!
//! [`SceneEngine`] implements [`PickEngine`] without any rendering: every
//! node carries its projected bounds, a depth, an opacity, and the flags the
//! pick configuration masks on. Sweeps are materialized at begin time and
//! drained in fixed-size batches, optionally with per-batch latency so
//! callers can observe interleaving.


use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use cadview_protocol::{BeginConfig, NodeId, PickConfig, Point2, Point3, SelectionItem};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::engine::{PickEngine, SweepId};
use crate::error::{Error, Result};

/// Default number of candidates per batch.
pub const DEFAULT_BATCH_SIZE: usize = 4;

fn default_true() -> bool {
	true
}

fn default_opacity() -> f32 {
	1.0
}

/// One node as the engine sees it after projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneNode {
	pub id: NodeId,
	/// Top-left corner of the projected bounds.
	pub min: Point2,
	/// Bottom-right corner of the projected bounds.
	pub max: Point2,
	/// Distance from the camera; smaller is closer.
	#[serde(default)]
	pub depth: f64,
	#[serde(default = "default_opacity")]
	pub opacity: f32,
	/// The node's own visibility flag.
	#[serde(default = "default_true")]
	pub visible: bool,
	/// Hidden through an ancestor even though `visible` is set.
	#[serde(default)]
	pub hidden_by_ancestor: bool,
	/// Clipped away by an active cutting section.
	#[serde(default)]
	pub cut: bool,
	/// Instance was requested by the viewer.
	#[serde(default = "default_true")]
	pub requested: bool,
}

impl SceneNode {
	/// Visible, opaque, requested node spanning `min`..`max`.
	pub fn new(id: impl Into<NodeId>, min: Point2, max: Point2) -> Self {
		Self {
			id: id.into(),
			min: min.min(max),
			max: min.max(max),
			depth: 0.0,
			opacity: 1.0,
			visible: true,
			hidden_by_ancestor: false,
			cut: false,
			requested: true,
		}
	}

	pub fn depth(mut self, depth: f64) -> Self {
		self.depth = depth;
		self
	}

	pub fn opacity(mut self, opacity: f32) -> Self {
		self.opacity = opacity;
		self
	}

	pub fn hidden_by_ancestor(mut self) -> Self {
		self.hidden_by_ancestor = true;
		self
	}

	pub fn cut(mut self) -> Self {
		self.cut = true;
		self
	}

	pub fn unrequested(mut self) -> Self {
		self.requested = false;
		self
	}

	fn passes(&self, config: &PickConfig) -> bool {
		if !self.visible {
			return false;
		}
		if config.force_effective_scene_visibility_mask && self.hidden_by_ancestor {
			return false;
		}
		if self.cut && !config.ignore_cutting_sections {
			return false;
		}
		if !self.requested && config.ignore_unrequested_instances {
			return false;
		}
		true
	}

	fn overlaps(&self, min: Point2, max: Point2) -> bool {
		self.min.x < max.x && self.max.x > min.x && self.min.y < max.y && self.max.y > min.y
	}

	fn contained_in(&self, min: Point2, max: Point2) -> bool {
		self.min.x >= min.x && self.max.x <= max.x && self.min.y >= min.y && self.max.y <= max.y
	}

	fn contains(&self, point: Point2) -> bool {
		point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
	}

	fn item_at(&self, point: Point2) -> SelectionItem {
		SelectionItem::node(self.id).with_position(Point3::new(point.x, point.y, self.depth))
	}
}

/// Serialized scene, as read by [`SceneEngine::load`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDescription {
	#[serde(default)]
	pub nodes: Vec<SceneNode>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub batch_size: Option<usize>,
	/// Per-batch latency in milliseconds.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub latency_ms: Option<u64>,
}

/// Counters for assertions and diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStats {
	pub sweeps_begun: u64,
	pub sweeps_released: u64,
	pub batches_served: u64,
	pub point_picks: u64,
}

/// In-memory [`PickEngine`].
pub struct SceneEngine {
	nodes: RwLock<Vec<SceneNode>>,
	sweeps: Mutex<HashMap<SweepId, VecDeque<SelectionItem>>>,
	next_sweep: AtomicU64,
	batch_size: usize,
	latency: Option<Duration>,
	fault: Mutex<Option<String>>,
	begun: Mutex<Vec<BeginConfig>>,
	stats: Mutex<EngineStats>,
}

impl Default for SceneEngine {
	fn default() -> Self {
		Self::new(Vec::new())
	}
}

impl SceneEngine {
	pub fn new(nodes: Vec<SceneNode>) -> Self {
		Self {
			nodes: RwLock::new(nodes),
			sweeps: Mutex::new(HashMap::new()),
			next_sweep: AtomicU64::new(1),
			batch_size: DEFAULT_BATCH_SIZE,
			latency: None,
			fault: Mutex::new(None),
			begun: Mutex::new(Vec::new()),
			stats: Mutex::new(EngineStats::default()),
		}
	}

	pub fn from_description(desc: SceneDescription) -> Self {
		let mut engine = Self::new(desc.nodes);
		if let Some(size) = desc.batch_size {
			engine = engine.with_batch_size(size);
		}
		if let Some(ms) = desc.latency_ms {
			engine = engine.with_latency(Duration::from_millis(ms));
		}
		engine
	}

	/// Reads a [`SceneDescription`] from a JSON file.
	pub fn load(path: &Path) -> Result<Self> {
		let raw = std::fs::read_to_string(path)?;
		let desc: SceneDescription = serde_json::from_str(&raw)?;
		Ok(Self::from_description(desc))
	}

	/// Sets the number of candidates per batch (at least one).
	pub fn with_batch_size(mut self, batch_size: usize) -> Self {
		self.batch_size = batch_size.max(1);
		self
	}

	/// Delays every batch by `latency`.
	pub fn with_latency(mut self, latency: Duration) -> Self {
		self.latency = Some(latency);
		self
	}

	/// Makes the next [`next_batch`](PickEngine::next_batch) call fail once.
	pub fn inject_fault(&self, message: impl Into<String>) {
		*self.fault.lock() = Some(message.into());
	}

	pub fn set_opacity(&self, node: NodeId, opacity: f32) -> Result<()> {
		let mut nodes = self.nodes.write();
		let entry = nodes.iter_mut().find(|n| n.id == node).ok_or(Error::NodeNotFound(node))?;
		entry.opacity = opacity;
		Ok(())
	}

	pub fn insert_node(&self, node: SceneNode) {
		let mut nodes = self.nodes.write();
		nodes.retain(|n| n.id != node.id);
		nodes.push(node);
	}

	/// Every begin configuration submitted so far, oldest first.
	pub fn begun_configs(&self) -> Vec<BeginConfig> {
		self.begun.lock().clone()
	}

	pub fn last_begin_config(&self) -> Option<BeginConfig> {
		self.begun.lock().last().cloned()
	}

	pub fn stats(&self) -> EngineStats {
		*self.stats.lock()
	}

	/// Number of sweeps begun but not yet released.
	pub fn open_sweeps(&self) -> usize {
		self.sweeps.lock().len()
	}

	fn candidates(&self, config: &BeginConfig) -> Vec<SelectionItem> {
		let nodes = self.nodes.read();
		let mut hits: Vec<&SceneNode> = match config {
			BeginConfig::ScreenByArea {
				pick_config,
				area_css_min,
				area_css_max,
			} => nodes
				.iter()
				.filter(|n| n.passes(pick_config))
				.filter(|n| {
					if pick_config.must_be_fully_contained {
						n.contained_in(*area_css_min, *area_css_max)
					} else {
						n.overlaps(*area_css_min, *area_css_max)
					}
				})
				.collect(),
			BeginConfig::RayDrill {
				pick_config,
				ray_css_origin,
				ray_css_box_radius,
			} => {
				let min = Point2::new(ray_css_origin.x - ray_css_box_radius, ray_css_origin.y - ray_css_box_radius);
				let max = Point2::new(ray_css_origin.x + ray_css_box_radius, ray_css_origin.y + ray_css_box_radius);
				nodes.iter().filter(|n| n.passes(pick_config)).filter(|n| n.overlaps(min, max)).collect()
			}
		};
		hits.sort_by(|a, b| a.depth.total_cmp(&b.depth).then(a.id.cmp(&b.id)));

		let anchor = match config {
			BeginConfig::ScreenByArea {
				area_css_min,
				area_css_max,
				..
			} => Point2::new((area_css_min.x + area_css_max.x) / 2.0, (area_css_min.y + area_css_max.y) / 2.0),
			BeginConfig::RayDrill { ray_css_origin, .. } => *ray_css_origin,
		};
		hits.into_iter().map(|n| n.item_at(anchor)).collect()
	}
}

#[async_trait]
impl PickEngine for SceneEngine {
	async fn begin_selection(&self, config: &BeginConfig) -> Result<SweepId> {
		config.validate()?;

		let sweep = SweepId(self.next_sweep.fetch_add(1, Ordering::SeqCst));
		let candidates = self.candidates(config);
		debug!(
			target = "cadview.engine",
			%sweep,
			kind = config.kind(),
			candidates = candidates.len(),
			"begin selection"
		);

		self.sweeps.lock().insert(sweep, candidates.into());
		self.begun.lock().push(config.clone());
		self.stats.lock().sweeps_begun += 1;
		Ok(sweep)
	}

	async fn next_batch(&self, sweep: SweepId) -> Result<Option<Vec<SelectionItem>>> {
		if let Some(latency) = self.latency {
			tokio::time::sleep(latency).await;
		}

		if let Some(message) = self.fault.lock().take() {
			return Err(Error::Engine(message));
		}

		let mut sweeps = self.sweeps.lock();
		let queue = sweeps.get_mut(&sweep).ok_or(Error::SweepNotFound(sweep))?;
		if queue.is_empty() {
			return Ok(None);
		}

		let take = self.batch_size.min(queue.len());
		let batch: Vec<SelectionItem> = queue.drain(..take).collect();
		trace!(target = "cadview.engine", %sweep, size = batch.len(), "serving batch");
		self.stats.lock().batches_served += 1;
		Ok(Some(batch))
	}

	fn release_selection(&self, sweep: SweepId) {
		if self.sweeps.lock().remove(&sweep).is_some() {
			self.stats.lock().sweeps_released += 1;
		}
	}

	async fn pick_from_point(&self, point: Point2, config: &PickConfig) -> Result<Option<SelectionItem>> {
		if !point.is_finite() {
			return Err(Error::InvalidArgument(format!("pick point {point} is not finite")));
		}
		self.stats.lock().point_picks += 1;

		let nodes = self.nodes.read();
		let hit = nodes
			.iter()
			.filter(|n| n.passes(config) && n.contains(point))
			.min_by(|a, b| a.depth.total_cmp(&b.depth).then(a.id.cmp(&b.id)));
		Ok(hit.map(|n| n.item_at(point)))
	}

	async fn node_opacity(&self, node: NodeId) -> Result<f32> {
		self.nodes
			.read()
			.iter()
			.find(|n| n.id == node)
			.map(|n| n.opacity)
			.ok_or(Error::NodeNotFound(node))
	}
}
