//! Incremental selection sessions and the state they write to.
//!
//! - [`SelectionSession`]: one generation-tagged sweep at a time per key
//! - [`SelectionPredicate`]: optional async per-candidate filter
//! - [`NodeSelection`]: the viewer's current node selection
//! - [`SessionRegistry`]: lazily created sessions keyed by purpose
//! - [`IdleTracker`]: busy/idle view over a session

mod error;
mod idle;
mod node_selection;
mod predicate;
mod registry;
mod session;


pub use error::{SelectionError, SelectionResult, SelectionResultExt};
pub use idle::IdleTracker;
pub use node_selection::NodeSelection;
pub use predicate::{PredicateFuture, SelectionPredicate};
pub use registry::SessionRegistry;
pub use session::{SelectionSession, SweepSummary};
