//! Primitive values used across the selection protocol.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Point in CSS pixel space, origin at the top-left corner of the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
	pub x: f64,
	pub y: f64,
}

impl Point2 {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Squared euclidean distance to `other`.
	pub fn distance_squared(&self, other: Point2) -> f64 {
		let dx = self.x - other.x;
		let dy = self.y - other.y;
		dx * dx + dy * dy
	}

	/// Component-wise minimum.
	pub fn min(&self, other: Point2) -> Point2 {
		Point2::new(self.x.min(other.x), self.y.min(other.y))
	}

	/// Component-wise maximum.
	pub fn max(&self, other: Point2) -> Point2 {
		Point2::new(self.x.max(other.x), self.y.max(other.y))
	}

	pub fn is_finite(&self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}
}

impl fmt::Display for Point2 {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({}, {})", self.x, self.y)
	}
}

/// Point in model space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
	pub x: f64,
	pub y: f64,
	pub z: f64,
}

impl Point3 {
	pub const fn new(x: f64, y: f64, z: f64) -> Self {
		Self { x, y, z }
	}
}

/// Engine-assigned node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "node#{}", self.0)
	}
}

impl From<u32> for NodeId {
	fn from(id: u32) -> Self {
		Self(id)
	}
}

/// A picked node, optionally with the model-space hit position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionItem {
	pub node_id: NodeId,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub position: Option<Point3>,
}

impl SelectionItem {
	pub fn node(node_id: impl Into<NodeId>) -> Self {
		Self {
			node_id: node_id.into(),
			position: None,
		}
	}

	pub fn with_position(mut self, position: Point3) -> Self {
		self.position = Some(position);
		self
	}
}

/// Mouse button carried by pointer input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
	#[default]
	Left,
	Right,
	Middle,
}

/// Modifier key that can gate an operator behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierKey {
	#[default]
	Ctrl,
	Alt,
	Shift,
}

/// Modifier state sampled with an input event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
	#[serde(default)]
	pub ctrl: bool,
	#[serde(default)]
	pub alt: bool,
	#[serde(default)]
	pub shift: bool,
}

impl Modifiers {
	pub const NONE: Modifiers = Modifiers {
		ctrl: false,
		alt: false,
		shift: false,
	};

	pub const CTRL: Modifiers = Modifiers {
		ctrl: true,
		alt: false,
		shift: false,
	};

	/// Returns true if `key` is held.
	pub fn is_down(&self, key: ModifierKey) -> bool {
		match key {
			ModifierKey::Ctrl => self.ctrl,
			ModifierKey::Alt => self.alt,
			ModifierKey::Shift => self.shift,
		}
	}
}
