//! Directions client: pairwise travel distance and route geometry.

use std::sync::Arc;
use std::time::Duration;

use rayon::prelude::*;
use serde::Deserialize;
use tracing::debug;

use crate::config::{PlannerSettings, TravelMode};
use crate::error::{PlannerError, ServiceError};
use crate::polyline::{self, Polyline};
use crate::retry::RetryPolicy;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

#[derive(Debug, Clone)]
pub struct DirectionsConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
    /// Maximum requests in flight at once.
    pub rate_limit_qps: usize,
    pub retry: RetryPolicy,
}

impl Default for DirectionsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(6),
            rate_limit_qps: 50,
            retry: RetryPolicy::default(),
        }
    }
}

impl DirectionsConfig {
    pub fn from_settings(settings: &PlannerSettings) -> Self {
        Self {
            api_key: settings.api_key.clone(),
            timeout: Duration::from_secs(settings.http_timeout_s),
            rate_limit_qps: settings.rate_limit_qps,
            ..Self::default()
        }
    }
}

/// What one directions lookup yields: the leg distance and the encoded
/// overview geometry.
#[derive(Debug, Clone)]
pub struct RouteLeg {
    pub distance_m: u32,
    pub polyline: String,
}

/// One lookup against a directions backend. `mode` is never `Direct`; that
/// case is handled analytically before a client is consulted.
pub trait DirectionsApi: Send + Sync {
    fn route(
        &self,
        origin: (f64, f64),
        destination: (f64, f64),
        mode: TravelMode,
    ) -> Result<RouteLeg, ServiceError>;
}

/// HTTP adapter for the directions service.
#[derive(Debug)]
pub struct HttpDirectionsApi {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl HttpDirectionsApi {
    pub fn new(config: &DirectionsConfig) -> Result<Self, PlannerError> {
        if config.api_key.is_empty() {
            return Err(PlannerError::Config(
                "directions API key is missing".to_string(),
            ));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| PlannerError::Config(format!("http client: {err}")))?;
        Ok(Self {
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            client,
        })
    }
}

impl DirectionsApi for HttpDirectionsApi {
    fn route(
        &self,
        origin: (f64, f64),
        destination: (f64, f64),
        mode: TravelMode,
    ) -> Result<RouteLeg, ServiceError> {
        let origin = format!("{},{}", origin.0, origin.1);
        let destination = format!("{},{}", destination.0, destination.1);
        let response: DirectionsResponse = self
            .client
            .get(&self.base_url)
            .query(&[
                ("origin", origin.as_str()),
                ("destination", destination.as_str()),
                ("mode", mode.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()?
            .json()?;
        if response.status != "OK" {
            return Err(ServiceError::Status(response.status));
        }
        let route = response
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::Malformed("directions response has no routes".to_string()))?;
        let leg = route
            .legs
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::Malformed("route has no legs".to_string()))?;
        Ok(RouteLeg {
            distance_m: leg.distance.value,
            polyline: route.overview_polyline.points,
        })
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    legs: Vec<Leg>,
    overview_polyline: OverviewPolyline,
}

#[derive(Debug, Deserialize)]
struct Leg {
    distance: Distance,
}

#[derive(Debug, Deserialize)]
struct Distance {
    value: u32,
}

#[derive(Debug, Deserialize)]
struct OverviewPolyline {
    points: String,
}

/// Retrying, rate-limited front end over a [`DirectionsApi`].
pub struct DirectionsClient {
    api: Arc<dyn DirectionsApi>,
    retry: RetryPolicy,
    pool: rayon::ThreadPool,
}

impl DirectionsClient {
    pub fn new(config: DirectionsConfig) -> Result<Self, PlannerError> {
        let api = Arc::new(HttpDirectionsApi::new(&config)?);
        Self::with_api(api, &config)
    }

    /// Builds a client over an arbitrary backend; test seam.
    pub fn with_api(
        api: Arc<dyn DirectionsApi>,
        config: &DirectionsConfig,
    ) -> Result<Self, PlannerError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.rate_limit_qps.max(1))
            .build()
            .map_err(|err| PlannerError::Config(format!("worker pool: {err}")))?;
        Ok(Self {
            api,
            retry: config.retry,
            pool,
        })
    }

    /// Travel distance between two coordinates, in meters.
    pub fn distance(
        &self,
        origin: (f64, f64),
        destination: (f64, f64),
        mode: TravelMode,
    ) -> Result<u32, ServiceError> {
        self.retry
            .run(|| self.api.route(origin, destination, mode))
            .map(|leg| leg.distance_m)
    }

    /// Decoded overview geometry between two coordinates.
    pub fn polyline(
        &self,
        origin: (f64, f64),
        destination: (f64, f64),
        mode: TravelMode,
    ) -> Result<Polyline, ServiceError> {
        let leg = self.retry.run(|| self.api.route(origin, destination, mode))?;
        polyline::decode(&leg.polyline).map_err(|err| ServiceError::Malformed(err.to_string()))
    }

    /// Fetches many pairs at once, at most `rate_limit_qps` in flight.
    ///
    /// Results come back in input order, one per pair, so the caller can
    /// attribute each outcome even though completion order is arbitrary.
    /// Every pair runs to completion; a failed pair never cancels siblings.
    pub fn distances(
        &self,
        pairs: &[((f64, f64), (f64, f64))],
        mode: TravelMode,
    ) -> Vec<Result<u32, ServiceError>> {
        debug!(count = pairs.len(), mode = %mode, "fetching directions");
        self.pool.install(|| {
            pairs
                .par_iter()
                .map(|&(origin, destination)| self.distance(origin, destination, mode))
                .collect()
        })
    }
}
