//! Core domain types and pure logic for House Census.
//!
//! Holds the character record model, the birth-date parser, the house
//! aggregator, the shared error type and the CLI settings.

pub mod aggregator;
pub mod dates;
pub mod error;
pub mod models;
pub mod settings;
