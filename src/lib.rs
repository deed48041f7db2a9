//! Constrained topology tree editor core.
//!
//! A three-level cluster → server → bucket tree held in an arena, a move
//! validator for drag-and-drop, a selection state machine and the editor
//! service that drives a rendering bridge.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod tree_traits;
pub mod util;
