//! Test fixtures for trip-planner.
//!
//! Provides realistic test data: real Paris landmarks with OpenStreetMap
//! coordinates, grouped so day-assignment tests have a clear north/south
//! split.

pub mod paris_locations;

pub use paris_locations::*;
