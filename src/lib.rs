//! trip-planner core pipeline
//!
//! Turns named places plus constraints (home, per-day mandatory stops, a
//! travel mode) into ordered visiting sequences approximating minimum travel
//! cost. Geocoding and directions lookups are cached on disk, rate-limited
//! and retried; the tour ordering itself is delegated to an external
//! [`solver::RouteSolver`].

pub mod config;
pub mod error;
pub mod retry;
pub mod cache;
pub mod haversine;
pub mod polyline;
pub mod geocode;
pub mod directions;
pub mod matrix;
pub mod days;
pub mod solver;
pub mod planner;
