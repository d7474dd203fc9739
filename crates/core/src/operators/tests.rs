use std::sync::Arc;
use std::time::Duration;

use cadview_protocol::{BeginConfig, Modifiers, MouseButton, NodeId, PickConfig, Point2, SelectionItem};
use cadview_runtime::{SceneEngine, SceneNode};

use super::*;
use crate::config::ViewerConfig;
use crate::events::ViewerEvent;
use crate::selection::SelectionError;
use crate::viewer::Viewer;

/// Node 0 top-left, nodes 1 and 2 stacked around (100,100) with 2 behind
/// and translucent, node 3 alone further out.
fn scene() -> SceneEngine {
	SceneEngine::new(vec![
		SceneNode::new(0u32, Point2::new(0.0, 0.0), Point2::new(60.0, 60.0)),
		SceneNode::new(1u32, Point2::new(80.0, 80.0), Point2::new(120.0, 120.0)).depth(1.0),
		SceneNode::new(2u32, Point2::new(90.0, 90.0), Point2::new(130.0, 130.0))
			.depth(2.0)
			.opacity(0.5),
		SceneNode::new(3u32, Point2::new(300.0, 300.0), Point2::new(350.0, 350.0)),
	])
}

fn viewer_over(engine: &Arc<SceneEngine>) -> Viewer {
	Viewer::new(engine.clone(), ViewerConfig::default())
}

fn ids(viewer: &Viewer) -> Vec<u32> {
	let mut ids: Vec<u32> = viewer.selection().node_ids().into_iter().map(|n| n.0).collect();
	ids.sort_unstable();
	ids
}

async fn drag(chain: &OperatorChain, from: (f64, f64), to: (f64, f64), modifiers: Modifiers) -> MouseInput {
	chain.mouse_down(&mut MouseInput::left(from.0, from.1).with_modifiers(modifiers)).await.unwrap();
	chain.mouse_move(&mut MouseInput::left(to.0, to.1).with_modifiers(modifiers)).await.unwrap();
	let mut up = MouseInput::left(to.0, to.1).with_modifiers(modifiers);
	chain.mouse_up(&mut up).await.unwrap();
	up
}

fn area_chain(viewer: &Viewer) -> OperatorChain {
	let mut chain = OperatorChain::new();
	chain.push(10, Arc::new(AreaSelectOperator::new(viewer)));
	chain
}

fn drill_chain(viewer: &Viewer) -> (OperatorChain, Arc<RayDrillSelectOperator>) {
	let drill = Arc::new(RayDrillSelectOperator::new(viewer));
	let mut chain = OperatorChain::new();
	chain.push(0, drill.clone());
	(chain, drill)
}

async fn until(mut cond: impl FnMut() -> bool) {
	for _ in 0..1000 {
		if cond() {
			return;
		}
		tokio::task::yield_now().await;
	}
	panic!("condition not reached");
}

#[test]
fn test_horizontal_line_is_not_a_selection() {
	assert!(!allow_selection(Point2::new(50.0, 50.0), Point2::new(150.0, 50.0)));
	assert!(!allow_selection(Point2::new(50.0, 50.0), Point2::new(50.0, 150.0)));
	assert!(allow_selection(Point2::new(50.0, 50.0), Point2::new(51.0, 51.0)));
	assert!(area_begin_config(&PickConfig::default(), Point2::new(50.0, 50.0), Point2::new(150.0, 50.0)).is_none());
}

#[test]
fn test_selection_rect_normalizes_corners() {
	let (min, max) = selection_rect(Point2::new(100.0, 10.0), Point2::new(10.0, 200.0));
	assert_eq!(min, Point2::new(10.0, 10.0));
	assert_eq!(max, Point2::new(100.0, 200.0));
}

#[tokio::test]
async fn test_degenerate_drag_never_reaches_engine() {
	let engine = Arc::new(scene());
	let viewer = viewer_over(&engine);
	let chain = area_chain(&viewer);

	let up = drag(&chain, (50.0, 50.0), (150.0, 50.0), Modifiers::NONE).await;

	assert!(!up.handled());
	assert!(engine.begun_configs().is_empty());
	assert_eq!(viewer.selection_session().generation(), 0);
}

#[tokio::test]
async fn test_left_to_right_drag_requires_full_containment() {
	let engine = Arc::new(scene());
	let viewer = viewer_over(&engine);
	let chain = area_chain(&viewer);

	let up = drag(&chain, (10.0, 10.0), (100.0, 200.0), Modifiers::NONE).await;

	assert!(up.handled());
	let expected = BeginConfig::ScreenByArea {
		pick_config: PickConfig::default().must_be_fully_contained(true),
		area_css_min: Point2::new(10.0, 10.0),
		area_css_max: Point2::new(100.0, 200.0),
	};
	assert_eq!(engine.last_begin_config(), Some(expected));
}

#[tokio::test]
async fn test_right_to_left_drag_selects_touched_nodes() {
	let engine = Arc::new(scene());
	let viewer = viewer_over(&engine);
	let chain = area_chain(&viewer);

	drag(&chain, (100.0, 100.0), (10.0, 10.0), Modifiers::NONE).await;

	let Some(BeginConfig::ScreenByArea {
		pick_config,
		area_css_min,
		area_css_max,
	}) = engine.last_begin_config()
	else {
		panic!("expected an area sweep");
	};
	assert!(!pick_config.must_be_fully_contained);
	assert_eq!(area_css_min, Point2::new(10.0, 10.0));
	assert_eq!(area_css_max, Point2::new(100.0, 100.0));
	assert_eq!(ids(&viewer), vec![0, 1, 2]);
}

#[tokio::test]
async fn test_ray_drill_triggers_within_click_threshold() {
	let engine = Arc::new(scene());
	let viewer = viewer_over(&engine);
	let (chain, _drill) = drill_chain(&viewer);

	// 3² + 4² = 25 is still a click.
	let up = drag(&chain, (100.0, 100.0), (103.0, 104.0), Modifiers::NONE).await;
	assert!(up.handled());
	assert_eq!(engine.begun_configs().len(), 1);

	// 3² + 5² = 34 is a drag.
	let up = drag(&chain, (100.0, 100.0), (103.0, 105.0), Modifiers::NONE).await;
	assert!(!up.handled());
	assert_eq!(engine.begun_configs().len(), 1);
}

#[tokio::test]
async fn test_ray_drill_uses_press_position_and_box_radius() {
	let engine = Arc::new(scene());
	let viewer = viewer_over(&engine);
	let (chain, _drill) = drill_chain(&viewer);

	drag(&chain, (100.0, 100.0), (100.0, 100.0), Modifiers::NONE).await;

	assert_eq!(
		engine.last_begin_config(),
		Some(BeginConfig::RayDrill {
			pick_config: PickConfig::default(),
			ray_css_origin: Point2::new(100.0, 100.0),
			ray_css_box_radius: 10.0,
		})
	);
	assert_eq!(ids(&viewer), vec![1, 2]);

	// Released 5px away: still a click, drilled at the press point.
	drag(&chain, (100.0, 100.0), (103.0, 104.0), Modifiers::NONE).await;

	assert_eq!(
		engine.last_begin_config(),
		Some(BeginConfig::RayDrill {
			pick_config: PickConfig::default(),
			ray_css_origin: Point2::new(100.0, 100.0),
			ray_css_box_radius: 10.0,
		})
	);
}

#[tokio::test]
async fn test_ray_drill_can_skip_translucent_nodes() {
	let engine = Arc::new(scene());
	let viewer = viewer_over(&engine);
	let (chain, drill) = drill_chain(&viewer);
	drill.set_ignore_transparency(true);

	drag(&chain, (100.0, 100.0), (100.0, 100.0), Modifiers::NONE).await;

	assert_eq!(ids(&viewer), vec![1]);
}

#[tokio::test]
async fn test_ignore_transparency_defaults_from_config() {
	let engine = Arc::new(scene());
	let config = ViewerConfig {
		ignore_transparency: true,
		..ViewerConfig::default()
	};
	let viewer = Viewer::new(engine, config);
	assert!(RayDrillSelectOperator::new(&viewer).ignore_transparency());
}

#[tokio::test]
async fn test_additive_modifier_keeps_previous_selection() {
	let engine = Arc::new(scene());
	let viewer = viewer_over(&engine);
	let mut chain = area_chain(&viewer);
	chain.push(0, Arc::new(RayDrillSelectOperator::new(&viewer)));

	drag(&chain, (100.0, 100.0), (100.0, 100.0), Modifiers::NONE).await;
	assert_eq!(ids(&viewer), vec![1, 2]);

	drag(&chain, (290.0, 290.0), (360.0, 360.0), Modifiers::CTRL).await;
	assert_eq!(ids(&viewer), vec![1, 2, 3]);

	drag(&chain, (290.0, 290.0), (360.0, 360.0), Modifiers::NONE).await;
	assert_eq!(ids(&viewer), vec![3]);
}

#[tokio::test]
async fn test_chain_stops_at_first_handler() {
	let engine = Arc::new(scene());
	let viewer = viewer_over(&engine);
	let mut chain = area_chain(&viewer);
	chain.push(0, Arc::new(RayDrillSelectOperator::new(&viewer)));
	assert_eq!(chain.names(), vec![AreaSelectOperator::NAME, RayDrillSelectOperator::NAME]);

	// A click is degenerate for the area operator and falls through.
	drag(&chain, (100.0, 100.0), (100.0, 100.0), Modifiers::NONE).await;
	assert_eq!(engine.last_begin_config().map(|c| c.kind()), Some("ray-drill"));

	drag(&chain, (0.0, 0.0), (200.0, 200.0), Modifiers::NONE).await;
	let kinds: Vec<_> = engine.begun_configs().iter().map(|c| c.kind()).collect();
	assert_eq!(kinds, vec!["ray-drill", "area"]);
}

#[tokio::test]
async fn test_non_left_buttons_are_ignored() {
	let engine = Arc::new(scene());
	let viewer = viewer_over(&engine);
	let chain = area_chain(&viewer);

	let right = |x, y| MouseInput::new(Point2::new(x, y), MouseButton::Right, Modifiers::NONE);
	chain.mouse_down(&mut right(0.0, 0.0)).await.unwrap();
	chain.mouse_up(&mut right(200.0, 200.0)).await.unwrap();

	assert!(engine.begun_configs().is_empty());
}

#[tokio::test]
async fn test_escape_clears_in_background() {
	let engine = Arc::new(scene());
	let viewer = viewer_over(&engine);
	let chain = area_chain(&viewer);
	drag(&chain, (0.0, 0.0), (200.0, 200.0), Modifiers::NONE).await;
	assert!(!viewer.selection().is_empty());

	let mut key = KeyInput::escape();
	chain.key_down(&mut key).await.unwrap();

	assert!(key.handled());
	until(|| viewer.selection().is_empty()).await;
}

#[tokio::test]
async fn test_escape_cancels_drag() {
	let engine = Arc::new(scene());
	let viewer = viewer_over(&engine);
	let area = Arc::new(AreaSelectOperator::new(&viewer));
	let mut chain = OperatorChain::new();
	chain.push(0, area.clone());

	chain.mouse_down(&mut MouseInput::left(0.0, 0.0)).await.unwrap();
	chain.mouse_move(&mut MouseInput::left(50.0, 50.0)).await.unwrap();
	assert_eq!(area.rect(), Some((Point2::new(0.0, 0.0), Point2::new(50.0, 50.0))));

	chain.key_down(&mut KeyInput::escape()).await.unwrap();
	assert_eq!(area.state(), GestureState::Idle);

	chain.mouse_up(&mut MouseInput::left(200.0, 200.0)).await.unwrap();
	assert!(engine.begun_configs().is_empty());
}

#[tokio::test]
async fn test_deactivation_cancels_drag() {
	let engine = Arc::new(scene());
	let viewer = viewer_over(&engine);
	let area = Arc::new(AreaSelectOperator::new(&viewer));
	let mut chain = OperatorChain::new();
	chain.push(0, area.clone());

	chain.mouse_down(&mut MouseInput::left(0.0, 0.0)).await.unwrap();
	assert_eq!(area.state(), GestureState::Dragging);

	assert!(chain.remove(AreaSelectOperator::NAME).is_some());
	assert!(chain.is_empty());
	assert_eq!(area.state(), GestureState::Idle);

	area.on_mouse_up(&mut MouseInput::left(200.0, 200.0)).await.unwrap();
	assert!(engine.begun_configs().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_reset_waits_for_sweeps_to_settle() {
	let engine = Arc::new(scene().with_latency(Duration::from_millis(50)).with_batch_size(1));
	let viewer = viewer_over(&engine);
	let _area = AreaSelectOperator::new(&viewer);
	viewer.selection().add(vec![SelectionItem::node(3u32)]).await;

	let session = viewer.selection_session();
	let sweep = {
		let session = Arc::clone(&session);
		tokio::spawn(async move {
			let all = BeginConfig::screen_by_area(PickConfig::default(), Point2::new(-1.0, -1.0), Point2::new(400.0, 400.0));
			session.perform_selection(all, None).await
		})
	};
	until(|| !session.is_idle()).await;

	let observed = Arc::new(parking_lot::Mutex::new(None));
	let seen = Arc::clone(&observed);
	let during = viewer.clone();
	viewer
		.reset_assembly_tree(|| async move {
			*seen.lock() = Some((during.has_active_selection(), during.selection().len()));
			Ok(())
		})
		.await
		.unwrap();

	assert_eq!(*observed.lock(), Some((false, 0)));
	assert!(matches!(sweep.await.unwrap(), Err(SelectionError::Invalidated { .. })));
	assert_eq!(engine.open_sweeps(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_emptied_selection_stops_sweep() {
	let engine = Arc::new(scene().with_latency(Duration::from_millis(50)));
	let viewer = viewer_over(&engine);
	let _area = AreaSelectOperator::new(&viewer);
	viewer.selection().add(vec![SelectionItem::node(0u32)]).await;

	let session = viewer.selection_session();
	let sweep = {
		let session = Arc::clone(&session);
		tokio::spawn(async move { session.perform_selection(BeginConfig::ray_drill(PickConfig::default(), Point2::new(100.0, 100.0), 10.0), None).await })
	};
	until(|| !session.is_idle()).await;

	viewer.events().emit(ViewerEvent::SelectionArray(Vec::new())).await;

	assert!(!viewer.has_active_selection());
	assert!(matches!(sweep.await.unwrap(), Err(SelectionError::Invalidated { .. })));
	assert_eq!(viewer.selection().node_ids(), vec![NodeId(0)]);
}

#[tokio::test]
async fn test_hooks_detach_with_operator() {
	let engine = Arc::new(scene());
	let viewer = viewer_over(&engine);
	let area = AreaSelectOperator::new(&viewer);
	assert_eq!(viewer.events().handler_count(crate::events::EventKind::ResetAssemblyTreeBegin), 1);

	drop(area);
	assert_eq!(viewer.events().handler_count(crate::events::EventKind::ResetAssemblyTreeBegin), 0);
}

#[tokio::test]
async fn test_click_replaces_and_toggles() {
	let engine = Arc::new(scene());
	let viewer = viewer_over(&engine);
	let mut chain = OperatorChain::new();
	chain.push(0, Arc::new(ClickSelectOperator::new(&viewer)));

	// Front-most of the stacked pair.
	drag(&chain, (100.0, 100.0), (100.0, 100.0), Modifiers::NONE).await;
	assert_eq!(ids(&viewer), vec![1]);

	drag(&chain, (20.0, 20.0), (20.0, 20.0), Modifiers::NONE).await;
	assert_eq!(ids(&viewer), vec![0]);

	drag(&chain, (320.0, 320.0), (320.0, 320.0), Modifiers::CTRL).await;
	assert_eq!(ids(&viewer), vec![0, 3]);

	drag(&chain, (20.0, 20.0), (20.0, 20.0), Modifiers::CTRL).await;
	assert_eq!(ids(&viewer), vec![3]);

	// Empty space: additive keeps, plain clears.
	drag(&chain, (200.0, 200.0), (200.0, 200.0), Modifiers::CTRL).await;
	assert_eq!(ids(&viewer), vec![3]);
	drag(&chain, (200.0, 200.0), (200.0, 200.0), Modifiers::NONE).await;
	assert!(viewer.selection().is_empty());
	assert_eq!(engine.stats().point_picks, 6);
}

#[tokio::test(start_paused = true)]
async fn test_click_invalidates_running_sweep() {
	let engine = Arc::new(scene().with_latency(Duration::from_millis(50)));
	let viewer = viewer_over(&engine);
	let session = viewer.selection_session();
	let sweep = {
		let session = Arc::clone(&session);
		tokio::spawn(async move { session.perform_selection(BeginConfig::ray_drill(PickConfig::default(), Point2::new(100.0, 100.0), 10.0), None).await })
	};
	until(|| !session.is_idle()).await;

	let mut chain = OperatorChain::new();
	chain.push(0, Arc::new(ClickSelectOperator::new(&viewer)));
	drag(&chain, (320.0, 320.0), (320.0, 320.0), Modifiers::NONE).await;

	assert!(matches!(sweep.await.unwrap(), Err(SelectionError::Invalidated { .. })));
	assert_eq!(ids(&viewer), vec![3]);
}
