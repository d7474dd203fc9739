//! Configuration passed to the engine when picking.
//!
//! [`PickConfig`] controls engine-side masking for every pick.
//! [`BeginConfig`] describes the sampling region of one incremental sweep.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Point2;

/// Engine-side pick flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PickConfig {
	/// Pick against the effective (inherited) scene visibility instead of the
	/// per-node flag.
	pub force_effective_scene_visibility_mask: bool,
	/// Pick geometry that active cutting sections have clipped away.
	pub ignore_cutting_sections: bool,
	/// Skip instances the viewer never requested.
	pub ignore_unrequested_instances: bool,
	/// Only accept nodes whose projected bounds lie entirely inside the region.
	pub must_be_fully_contained: bool,
}

impl Default for PickConfig {
	fn default() -> Self {
		Self {
			force_effective_scene_visibility_mask: true,
			ignore_cutting_sections: false,
			ignore_unrequested_instances: true,
			must_be_fully_contained: false,
		}
	}
}

impl PickConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn must_be_fully_contained(mut self, value: bool) -> Self {
		self.must_be_fully_contained = value;
		self
	}

	pub fn ignore_cutting_sections(mut self, value: bool) -> Self {
		self.ignore_cutting_sections = value;
		self
	}

	pub fn ignore_unrequested_instances(mut self, value: bool) -> Self {
		self.ignore_unrequested_instances = value;
		self
	}

	pub fn force_effective_scene_visibility_mask(mut self, value: bool) -> Self {
		self.force_effective_scene_visibility_mask = value;
		self
	}
}

/// Sampling region of one incremental selection sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BeginConfig {
	/// Screen-space rectangle.
	ScreenByArea {
		pick_config: PickConfig,
		area_css_min: Point2,
		area_css_max: Point2,
	},
	/// Ray cast through every layer under a small screen-space box.
	RayDrill {
		pick_config: PickConfig,
		ray_css_origin: Point2,
		ray_css_box_radius: f64,
	},
}

/// Why a [`BeginConfig`] cannot be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionError {
	/// Area rectangle has zero width or height.
	DegenerateArea,
	/// Area corners are not ordered as min/max.
	InvertedArea,
	/// A coordinate is NaN or infinite.
	NonFiniteCoordinate,
	/// Ray box radius is zero, negative, or not finite.
	InvalidRadius,
}

impl fmt::Display for RegionError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::DegenerateArea => write!(f, "selection area has zero width or height"),
			Self::InvertedArea => write!(f, "selection area min exceeds max"),
			Self::NonFiniteCoordinate => write!(f, "selection region has a non-finite coordinate"),
			Self::InvalidRadius => write!(f, "ray box radius must be positive"),
		}
	}
}

impl std::error::Error for RegionError {}

impl BeginConfig {
	/// Area config from two rectangle corners in any order.
	pub fn screen_by_area(pick_config: PickConfig, a: Point2, b: Point2) -> Self {
		Self::ScreenByArea {
			pick_config,
			area_css_min: a.min(b),
			area_css_max: a.max(b),
		}
	}

	pub fn ray_drill(pick_config: PickConfig, origin: Point2, box_radius: f64) -> Self {
		Self::RayDrill {
			pick_config,
			ray_css_origin: origin,
			ray_css_box_radius: box_radius,
		}
	}

	pub fn pick_config(&self) -> &PickConfig {
		match self {
			Self::ScreenByArea { pick_config, .. } | Self::RayDrill { pick_config, .. } => pick_config,
		}
	}

	/// Short name used in logs.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::ScreenByArea { .. } => "area",
			Self::RayDrill { .. } => "ray-drill",
		}
	}

	/// Checks that the region samples a non-empty part of the screen.
	pub fn validate(&self) -> Result<(), RegionError> {
		match self {
			Self::ScreenByArea {
				area_css_min: min,
				area_css_max: max,
				..
			} => {
				if !min.is_finite() || !max.is_finite() {
					return Err(RegionError::NonFiniteCoordinate);
				}
				if min.x == max.x || min.y == max.y {
					return Err(RegionError::DegenerateArea);
				}
				if min.x > max.x || min.y > max.y {
					return Err(RegionError::InvertedArea);
				}
				Ok(())
			}
			Self::RayDrill {
				ray_css_origin,
				ray_css_box_radius,
				..
			} => {
				if !ray_css_origin.is_finite() {
					return Err(RegionError::NonFiniteCoordinate);
				}
				if !(ray_css_box_radius.is_finite() && *ray_css_box_radius > 0.0) {
					return Err(RegionError::InvalidRadius);
				}
				Ok(())
			}
		}
	}
}
