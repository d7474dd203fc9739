//! Viewer configuration: [`ViewerConfig`].

use std::path::Path;

use cadview_protocol::{ModifierKey, PickConfig};
use cadview_runtime::{Error, Result};
use serde::{Deserialize, Serialize};

/// Session key shared by the selection operators.
pub const DEFAULT_SELECTION_KEY: &str = "SelectionManager";

/// Squared press/release distance under which a gesture counts as a click.
pub const CLICK_THRESHOLD_SQ: f64 = 25.0;

/// Half-size of the screen-space box a ray-drill samples.
pub const RAY_BOX_RADIUS: f64 = 10.0;

/// Upper bound on concurrent predicate evaluations within one batch.
pub const DEFAULT_PREDICATE_CONCURRENCY: usize = 8;

/// Interaction settings shared by a viewer's operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewerConfig {
	/// Session key used by the area and ray-drill operators.
	pub selection_key: String,
	/// Base pick flags; operators override `mustBeFullyContained` per gesture.
	pub pick: PickConfig,
	/// Held modifier that keeps the current selection instead of clearing it.
	pub additive_modifier: ModifierKey,
	pub click_threshold_sq: f64,
	pub ray_box_radius: f64,
	/// Exclude non-opaque nodes from ray-drill results.
	pub ignore_transparency: bool,
	pub predicate_concurrency: usize,
}

impl Default for ViewerConfig {
	fn default() -> Self {
		Self {
			selection_key: DEFAULT_SELECTION_KEY.to_string(),
			pick: PickConfig::default(),
			additive_modifier: ModifierKey::Ctrl,
			click_threshold_sq: CLICK_THRESHOLD_SQ,
			ray_box_radius: RAY_BOX_RADIUS,
			ignore_transparency: false,
			predicate_concurrency: DEFAULT_PREDICATE_CONCURRENCY,
		}
	}
}

impl ViewerConfig {
	/// Reads and validates a JSON config file. Missing fields take defaults.
	pub fn load(path: &Path) -> Result<Self> {
		let raw = std::fs::read_to_string(path)?;
		let config: ViewerConfig = serde_json::from_str(&raw)?;
		config.validate()?;
		Ok(config)
	}

	/// Loads `path` when given, defaults otherwise.
	pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
		match path {
			Some(path) => Self::load(path),
			None => Ok(Self::default()),
		}
	}

	pub fn validate(&self) -> Result<()> {
		if self.selection_key.trim().is_empty() {
			return Err(Error::Config("selectionKey must not be empty".to_string()));
		}
		if !(self.click_threshold_sq.is_finite() && self.click_threshold_sq >= 0.0) {
			return Err(Error::Config(format!(
				"clickThresholdSq must be a non-negative number, got {}",
				self.click_threshold_sq
			)));
		}
		if !(self.ray_box_radius.is_finite() && self.ray_box_radius > 0.0) {
			return Err(Error::Config(format!("rayBoxRadius must be positive, got {}", self.ray_box_radius)));
		}
		if self.predicate_concurrency == 0 {
			return Err(Error::Config("predicateConcurrency must be at least 1".to_string()));
		}
		Ok(())
	}
}
