use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use cadview::Viewer;
use cadview_protocol::{Point2, SelectionItem};
use cadview_runtime::SceneEngine;
use serde::Serialize;

use super::resolve_config;
use crate::cli::PickArgs;
use crate::error::Result;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickReport {
	pub point: Point2,
	pub hit: Option<SelectionItem>,
}

pub async fn run(args: &PickArgs, config: Option<&Path>) -> Result<PickReport> {
	let config = resolve_config(config, None)?;
	let engine = SceneEngine::load(&args.scene).with_context(|| format!("loading scene {}", args.scene.display()))?;
	let viewer = Viewer::new(Arc::new(engine), config);

	let point = Point2::new(args.x, args.y);
	let hit = viewer.pick_from_point(point).await?;
	tracing::info!(target = "cadview.cli", %point, hit = ?hit.as_ref().map(|h| h.node_id), "pick");

	Ok(PickReport { point, hit })
}
