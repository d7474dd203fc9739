//! cadview runtime - engine contract, errors, and task plumbing
//!
//! This crate sits between the wire types in `cadview-protocol` and the
//! interaction layer in `cadview`:
//!
//! - **Engine contract**: [`PickEngine`], the async surface of the external
//!   viewer engine (incremental sweeps, point picks, node appearance)
//! - **Errors**: the shared [`Error`] / [`Result`] types
//! - **Tasks**: [`TaskSpawner`], fire-and-forget work with an error sink
//! - **Reference engine**: [`SceneEngine`], an in-memory engine over
//!   screen-space node rectangles used by tests and the CLI
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   cadview   │  Sessions, operators, dispatcher
//! └──────┬──────┘
//!        │ drives dyn PickEngine
//! ┌──────▼──────┐
//! │   runtime   │  This crate
//! │  ┌────────┐ │
//! │  │ Engine │ │  Trait + SceneEngine
//! │  └────────┘ │
//! │  ┌────────┐ │
//! │  │ Tasks  │ │  Detached work + error sink
//! │  └────────┘ │
//! └─────────────┘
//! ```

pub mod engine;
pub mod error;
pub mod scene;
pub mod task;

pub use engine::{PickEngine, SweepId};
pub use error::{Error, Result};
pub use scene::{EngineStats, SceneDescription, SceneEngine, SceneNode};
pub use task::{ErrorSink, TaskSpawner};
