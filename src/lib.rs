//! Persistent ink trail simulation.
//!
//! A probe drags across a floor and leaves ink that bleeds while wet, settles
//! and fades. The grid is double-buffered and advanced once per frame, on the
//! GPU in the windowed app or on the CPU for tests and the headless harness.

pub mod app;
pub mod config;
pub mod error;
pub mod gpu;
pub mod headless;
pub mod simulation;

pub use error::{Result, TrailError};
