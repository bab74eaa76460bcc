//! Terminal UI layer for house-census.
//!
//! Provides themes, the header and date-range input components, the bar
//! chart view, and the application event loop built on top of [`ratatui`].

pub mod app;
pub mod chart_view;
pub mod components;
pub mod themes;

pub use census_core as core;
