//! Testing infrastructure for livedisplay tests.
//!
//! This crate provides utilities shared by the engine, runtime and CLI tests:
//! - `RecordingSurface`: a display surface that keeps every cell and icon
//! - `fetchers`: scripted, counting and manually completed producers
//! - `TestWorld`: isolated data directory plus CLI execution
//! - `assertions`: readable checks against surfaces and CLI output

pub mod assertions;
pub mod fetchers;
pub mod surface;
pub mod world;

pub use fetchers::{CountingFetcher, ManualFetcher, ScriptedFetcher};
pub use surface::{RecordingSurface, SurfaceEvent};
pub use world::{CliResult, TestWorld};

/// A fixed start time for simulated clocks, far from the epoch
pub const T0: i64 = 1_700_000_000_000;
