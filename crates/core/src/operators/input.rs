//! Pointer and keyboard input as seen by operators.

use cadview_protocol::{Modifiers, MouseButton, Point2};

/// Mouse input in CSS pixel space.
///
/// The `handled` flag is consumed by [`OperatorChain`](super::OperatorChain):
/// the first operator that sets it stops further propagation.
#[derive(Debug, Clone, PartialEq)]
pub struct MouseInput {
	pub position: Point2,
	pub button: MouseButton,
	pub modifiers: Modifiers,
	handled: bool,
}

impl MouseInput {
	pub fn new(position: Point2, button: MouseButton, modifiers: Modifiers) -> Self {
		Self {
			position,
			button,
			modifiers,
			handled: false,
		}
	}

	/// Left-button input without modifiers.
	pub fn left(x: f64, y: f64) -> Self {
		Self::new(Point2::new(x, y), MouseButton::Left, Modifiers::NONE)
	}

	pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
		self.modifiers = modifiers;
		self
	}

	pub fn handled(&self) -> bool {
		self.handled
	}

	pub fn set_handled(&mut self) {
		self.handled = true;
	}
}

/// Keys operators react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
	Escape,
	Other(String),
}

impl Key {
	/// Maps a DOM `KeyboardEvent.key` value.
	pub fn from_dom(key: &str) -> Self {
		match key {
			"Escape" | "Esc" => Self::Escape,
			other => Self::Other(other.to_string()),
		}
	}
}

/// Keyboard input.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyInput {
	pub key: Key,
	pub modifiers: Modifiers,
	handled: bool,
}

impl KeyInput {
	pub fn new(key: Key, modifiers: Modifiers) -> Self {
		Self {
			key,
			modifiers,
			handled: false,
		}
	}

	pub fn escape() -> Self {
		Self::new(Key::Escape, Modifiers::NONE)
	}

	pub fn handled(&self) -> bool {
		self.handled
	}

	pub fn set_handled(&mut self) {
		self.handled = true;
	}
}
