//! Data source layer for House Census.
//!
//! Retrieves the character dataset over HTTP or from a local JSON file and
//! decodes it leniently into [`census_core::models::Record`] values.

pub mod decode;
pub mod source;

pub use census_core as core;
