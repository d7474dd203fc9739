//! Async contract of the external viewer engine.
//!
//! The engine owns ray casting, streaming and the scene graph. The
//! interaction layer only drives it through [`PickEngine`]: an incremental
//! sweep is opened with [`begin_selection`](PickEngine::begin_selection),
//! drained batch by batch with [`next_batch`](PickEngine::next_batch), and
//! always handed back with [`release_selection`](PickEngine::release_selection).

use std::fmt;

use async_trait::async_trait;
use cadview_protocol::{BeginConfig, NodeId, PickConfig, Point2, SelectionItem};

use crate::error::Result;

/// Engine-side handle of one incremental sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SweepId(pub u64);

impl fmt::Display for SweepId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "sweep@{}", self.0)
	}
}

/// Picking surface of the viewer engine.
#[async_trait]
pub trait PickEngine: Send + Sync {
	/// Opens an incremental sweep over the region described by `config`.
	async fn begin_selection(&self, config: &BeginConfig) -> Result<SweepId>;

	/// Returns the next batch of candidates, or `None` once the sweep is drained.
	async fn next_batch(&self, sweep: SweepId) -> Result<Option<Vec<SelectionItem>>>;

	/// Releases engine-side state for `sweep`. Unknown handles are ignored.
	///
	/// Synchronous so it can run from drop guards.
	fn release_selection(&self, sweep: SweepId);

	/// Picks the front-most node under `point`.
	async fn pick_from_point(&self, point: Point2, config: &PickConfig) -> Result<Option<SelectionItem>>;

	/// Returns the effective opacity of `node` in `[0, 1]`.
	async fn node_opacity(&self, node: NodeId) -> Result<f32>;
}
