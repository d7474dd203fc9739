//! Gesture scripts replayed by `cadview replay`.
//!
//! ```json
//! {
//!   "scene": "scene.json",
//!   "operators": ["area", "rayDrill"],
//!   "actions": [
//!     { "type": "drag", "from": { "x": 10, "y": 10 }, "to": { "x": 100, "y": 200 } },
//!     { "type": "click", "at": { "x": 40, "y": 40 }, "modifiers": { "ctrl": true } },
//!     { "type": "key", "key": "Escape" }
//!   ]
//! }
//! ```
//!
//! `scene` is either a path (relative to the script) or an inline scene
//! description. Operators are installed in listed order, first one highest.

use std::path::{Path, PathBuf};

use anyhow::Context;
use cadview::ViewerConfig;
use cadview_protocol::{Modifiers, MouseButton, Point2};
use cadview_runtime::{SceneDescription, SceneEngine};
use serde::Deserialize;

use crate::error::{CliError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
	pub scene: SceneSource,
	#[serde(default)]
	pub config: Option<ViewerConfig>,
	#[serde(default = "default_operators")]
	pub operators: Vec<OperatorKind>,
	#[serde(default)]
	pub actions: Vec<Action>,
}

fn default_operators() -> Vec<OperatorKind> {
	vec![OperatorKind::Area, OperatorKind::RayDrill]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SceneSource {
	Path(PathBuf),
	Inline(SceneDescription),
}

impl SceneSource {
	/// Loads the scene, resolving relative paths against `base`.
	pub fn load(&self, base: &Path) -> Result<SceneEngine> {
		match self {
			SceneSource::Inline(desc) => Ok(SceneEngine::from_description(desc.clone())),
			SceneSource::Path(path) => {
				let path = base.join(path);
				let engine = SceneEngine::load(&path).with_context(|| format!("loading scene {}", path.display()))?;
				Ok(engine)
			}
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperatorKind {
	Area,
	RayDrill,
	Click,
}

/// One scripted input or viewer call.
///
/// `detach` runs the release in the background so the next action starts
/// while its sweep is still streaming.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Action {
	MouseDown {
		at: Point2,
		#[serde(default)]
		button: MouseButton,
		#[serde(default)]
		modifiers: Modifiers,
	},
	MouseMove {
		at: Point2,
		#[serde(default)]
		modifiers: Modifiers,
	},
	MouseUp {
		at: Point2,
		#[serde(default)]
		button: MouseButton,
		#[serde(default)]
		modifiers: Modifiers,
		#[serde(default)]
		detach: bool,
	},
	/// Press at `from`, move and release at `to`.
	Drag {
		from: Point2,
		to: Point2,
		#[serde(default)]
		modifiers: Modifiers,
		#[serde(default)]
		detach: bool,
	},
	/// Press and release at `at`.
	Click {
		at: Point2,
		#[serde(default)]
		modifiers: Modifiers,
		#[serde(default)]
		detach: bool,
	},
	Key {
		key: String,
		#[serde(default)]
		modifiers: Modifiers,
	},
	/// Announce an assembly-tree rebuild.
	Reset,
	/// Clear the selection through the operators' session.
	Clear,
	/// Wait for detached releases and the session to settle.
	WaitForIdle,
	SetIgnoreTransparency { value: bool },
	Sleep { ms: u64 },
}

impl Action {
	pub fn name(&self) -> &'static str {
		match self {
			Action::MouseDown { .. } => "mouseDown",
			Action::MouseMove { .. } => "mouseMove",
			Action::MouseUp { .. } => "mouseUp",
			Action::Drag { .. } => "drag",
			Action::Click { .. } => "click",
			Action::Key { .. } => "key",
			Action::Reset => "reset",
			Action::Clear => "clear",
			Action::WaitForIdle => "waitForIdle",
			Action::SetIgnoreTransparency { .. } => "setIgnoreTransparency",
			Action::Sleep { .. } => "sleep",
		}
	}
}

impl Script {
	pub fn parse(path: &Path, raw: &str) -> Result<Self> {
		let script: Script = serde_json::from_str(raw).map_err(|err| CliError::Script {
			path: path.to_path_buf(),
			message: err.to_string(),
		})?;
		if script.operators.is_empty() {
			return Err(CliError::Script {
				path: path.to_path_buf(),
				message: "at least one operator is required".to_string(),
			});
		}
		Ok(script)
	}

	pub fn load(path: &Path) -> Result<Self> {
		let raw = std::fs::read_to_string(path).with_context(|| format!("reading script {}", path.display()))?;
		Self::parse(path, &raw)
	}
}
