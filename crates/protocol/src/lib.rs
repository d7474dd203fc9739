//! Wire types for the cadview selection protocol.
//!
//! This crate contains the serde-serializable types exchanged between the
//! interaction layer and the viewer engine: screen-space points, node
//! identifiers, pick configuration, and the begin configuration of a
//! selection sweep.
//!
//! Types in this crate are pure data. Behavior beyond validation and small
//! geometric helpers lives in `cadview-runtime` and `cadview`.

pub mod options;
pub mod types;

pub use options::*;
pub use types::*;
