//! Cross-module tests driving the engine end to end.
//!
//! # Test Structure
//!
//! - `scenarios.rs`: full games, sieges, rotation, undo/redo walks
//! - `properties.rs`: proptest over random call sequences, plus determinism
//! - `helpers.rs`: engine and roster setup shared by both

mod helpers;
mod scenarios;
