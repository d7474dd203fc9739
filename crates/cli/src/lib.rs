//! `cadview` command-line front end.
//!
//! Replays scripted pointer and keyboard gestures through the selection
//! operators against a JSON scene, and prints the resulting selection as a
//! JSON envelope on stdout. Diagnostics go to stderr through `tracing`.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
pub mod script;
pub mod styles;
