//! Runtime layer for House Census.
//!
//! Runs the one-shot dataset fetch in the background and owns the chart
//! store that recomputes house counts whenever a new range is applied.

pub mod orchestrator;
pub mod store;

pub use census_core as core;
pub use census_data as data;
