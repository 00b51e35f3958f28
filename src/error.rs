//! Error types for the planning pipeline.

use std::fmt;
use std::io;

use crate::solver::SolverError;

/// A single failed exchange with an external service.
///
/// These are recoverable at the probe/retry level; clients only escalate
/// them once every retry and probe is exhausted.
#[derive(Debug)]
pub enum ServiceError {
    /// Transport failure: timeout, connection error, unreadable body.
    Http(reqwest::Error),
    /// The service answered with a non-"OK" status field.
    Status(String),
    /// The response parsed but was missing an expected field.
    Malformed(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Http(err) => write!(f, "http request failed: {err}"),
            ServiceError::Status(status) => write!(f, "service returned status {status}"),
            ServiceError::Malformed(detail) => write!(f, "malformed response: {detail}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Http(err) => Some(err),
            ServiceError::Status(_) | ServiceError::Malformed(_) => None,
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Http(err)
    }
}

/// Top-level planning failure.
#[derive(Debug)]
pub enum PlannerError {
    /// Missing or invalid configuration, detected before any network activity.
    Config(String),
    /// A place could not be geocoded after exhausting every probe.
    Geocoding {
        place: String,
        source: ServiceError,
    },
    /// A pairwise directions lookup failed after exhausting retries.
    Directions {
        origin: (f64, f64),
        destination: (f64, f64),
        source: ServiceError,
    },
    /// The external solver failed or returned a structurally invalid tour.
    Solver(SolverError),
    /// A cache file could not be read or written.
    CacheIo(io::Error),
    /// A cache file did not contain the expected mapping.
    CacheFormat(serde_json::Error),
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannerError::Config(detail) => write!(f, "invalid configuration: {detail}"),
            PlannerError::Geocoding { place, source } => {
                write!(f, "geocoding failed for {place}: {source}")
            }
            PlannerError::Directions {
                origin,
                destination,
                source,
            } => write!(
                f,
                "directions failed for {},{} -> {},{}: {source}",
                origin.0, origin.1, destination.0, destination.1
            ),
            PlannerError::Solver(err) => write!(f, "solver failed: {err}"),
            PlannerError::CacheIo(err) => write!(f, "cache file error: {err}"),
            PlannerError::CacheFormat(err) => write!(f, "cache file is not a valid mapping: {err}"),
        }
    }
}

impl std::error::Error for PlannerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlannerError::Geocoding { source, .. } | PlannerError::Directions { source, .. } => {
                Some(source)
            }
            PlannerError::Solver(err) => Some(err),
            PlannerError::CacheIo(err) => Some(err),
            PlannerError::CacheFormat(err) => Some(err),
            PlannerError::Config(_) => None,
        }
    }
}

impl From<SolverError> for PlannerError {
    fn from(err: SolverError) -> Self {
        PlannerError::Solver(err)
    }
}

impl From<io::Error> for PlannerError {
    fn from(err: io::Error) -> Self {
        PlannerError::CacheIo(err)
    }
}

impl From<serde_json::Error> for PlannerError {
    fn from(err: serde_json::Error) -> Self {
        PlannerError::CacheFormat(err)
    }
}
