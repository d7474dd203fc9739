//! cadview: incremental, cancellable selection for a web CAD viewer.
//!
//! Screen-space selection gestures (area rectangles, ray drills, clicks) are
//! turned into engine sweeps whose results stream back batch by batch. A
//! [`SelectionSession`] keeps at most one sweep per purpose key effective:
//! starting a new sweep, clearing, or stopping supersedes the one in flight,
//! whose late results are discarded.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use cadview::{AreaSelectOperator, MouseInput, OperatorChain, Viewer, ViewerConfig};
//! use cadview_runtime::SceneEngine;
//!
//! let engine = Arc::new(SceneEngine::load("scene.json".as_ref())?);
//! let viewer = Viewer::new(engine, ViewerConfig::default());
//!
//! let mut chain = OperatorChain::new();
//! chain.push(10, Arc::new(AreaSelectOperator::new(&viewer)));
//!
//! chain.mouse_down(&mut MouseInput::left(10.0, 10.0)).await?;
//! chain.mouse_up(&mut MouseInput::left(100.0, 200.0)).await?;
//! println!("{:?}", viewer.selection().node_ids());
//! ```

pub mod config;
pub mod events;
pub mod handlers;
pub mod operators;
pub mod selection;
pub mod viewer;

pub use cadview_protocol::{
	BeginConfig, ModifierKey, Modifiers, MouseButton, NodeId, PickConfig, Point2, Point3, RegionError, SelectionItem,
};
pub use cadview_runtime::{Error, PickEngine, Result, SceneEngine, SweepId, TaskSpawner};
pub use config::ViewerConfig;
pub use events::{Dispatcher, EventKind, ViewerEvent};
pub use handlers::Subscription;
pub use operators::{
	AreaSelectOperator, ClickSelectOperator, GestureState, Key, KeyInput, MouseInput, Operator, OperatorChain,
	RayDrillSelectOperator, SessionHooks,
};
pub use selection::{
	IdleTracker, NodeSelection, SelectionError, SelectionPredicate, SelectionResult, SelectionResultExt,
	SelectionSession, SessionRegistry, SweepSummary,
};
pub use viewer::Viewer;
