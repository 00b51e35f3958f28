//! Geocoding client: place names to coordinates.
//!
//! Each place is resolved through an ordered probe list (alt-address
//! override, then generated city/country variants), with bounded-concurrency
//! batch resolution and a shared on-disk cache.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rayon::prelude::*;
use serde::Deserialize;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::cache::GeocodeCache;
use crate::config::PlannerSettings;
use crate::error::{PlannerError, ServiceError};
use crate::retry::RetryPolicy;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Removes combining marks after NFKD normalization, so accented place names
/// get an ASCII-friendly probe variant.
pub fn strip_accents(input: &str) -> String {
    input.nfkd().filter(|ch| !is_combining_mark(*ch)).collect()
}

#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub api_key: String,
    /// Country appended to the third probe.
    pub country: String,
    pub timeout: Duration,
    /// Maximum requests in flight at once.
    pub rate_limit_qps: usize,
    /// Pause after a failed probe before trying the next one.
    pub probe_delay: Duration,
    pub retry: RetryPolicy,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            country: "France".to_string(),
            timeout: Duration::from_secs(6),
            rate_limit_qps: 50,
            probe_delay: Duration::from_millis(20),
            retry: RetryPolicy::default(),
        }
    }
}

impl GeocoderConfig {
    pub fn from_settings(settings: &PlannerSettings) -> Self {
        Self {
            api_key: settings.api_key.clone(),
            country: settings.country.clone(),
            timeout: Duration::from_secs(settings.http_timeout_s),
            rate_limit_qps: settings.rate_limit_qps,
            probe_delay: Duration::from_secs_f64(settings.probe_delay_s),
            ..Self::default()
        }
    }
}

/// One lookup against a geocoding backend. Implemented over HTTP in
/// production and by in-memory fakes in tests.
pub trait GeocodeApi: Send + Sync {
    /// Returns the best-match coordinate for a free-text query.
    fn lookup(&self, query: &str) -> Result<(f64, f64), ServiceError>;
}

/// HTTP adapter for the geocoding service.
#[derive(Debug)]
pub struct HttpGeocodeApi {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl HttpGeocodeApi {
    pub fn new(config: &GeocoderConfig) -> Result<Self, PlannerError> {
        if config.api_key.is_empty() {
            return Err(PlannerError::Config(
                "geocoding API key is missing".to_string(),
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

impl GeocodeApi for HttpGeocodeApi {
    fn lookup(&self, query: &str) -> Result<(f64, f64), ServiceError> {
        let response: GeocodeResponse = self
            .client
            .get(&self.base_url)
            .query(&[("address", query), ("key", self.api_key.as_str())])
            .send()?
            .json()?;
        if response.status != "OK" {
            return Err(ServiceError::Status(response.status));
        }
        let result = response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::Malformed("geocode response has no results".to_string()))?;
        Ok((result.geometry.location.lat, result.geometry.location.lng))
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Resolves batches of place names, probe by probe, through a bounded pool.
pub struct GeocodingClient {
    api: Arc<dyn GeocodeApi>,
    country: String,
    probe_delay: Duration,
    retry: RetryPolicy,
    pool: rayon::ThreadPool,
}

impl GeocodingClient {
    pub fn new(config: GeocoderConfig) -> Result<Self, PlannerError> {
        let api = Arc::new(HttpGeocodeApi::new(&config)?);
        Self::with_api(api, &config)
    }

    /// Builds a client over an arbitrary backend; test seam.
    pub fn with_api(api: Arc<dyn GeocodeApi>, config: &GeocoderConfig) -> Result<Self, PlannerError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.rate_limit_qps.max(1))
            .build()
            .map_err(|err| PlannerError::Config(format!("worker pool: {err}")))?;
        Ok(Self {
            api,
            country: config.country.clone(),
            probe_delay: config.probe_delay,
            retry: config.retry,
            pool,
        })
    }

    /// Resolves every place to a coordinate, consulting and updating `cache`.
    ///
    /// Uncached places are fetched concurrently, at most `rate_limit_qps` in
    /// flight. All outstanding work completes before the batch returns; on
    /// failure the first error is surfaced and successfully resolved siblings
    /// stay in the cache.
    pub fn resolve(
        &self,
        places: &[String],
        city: &str,
        alt_addresses: &BTreeMap<String, String>,
        cache: &GeocodeCache,
    ) -> Result<BTreeMap<String, (f64, f64)>, PlannerError> {
        let pending: Vec<&String> = places.iter().filter(|name| !cache.contains(name)).collect();
        if !pending.is_empty() {
            debug!(city, count = pending.len(), "geocoding uncached places");
        }

        let failures: Vec<PlannerError> = self.pool.install(|| {
            pending
                .par_iter()
                .filter_map(|name| self.resolve_one(name, city, alt_addresses, cache).err())
                .collect()
        });
        if let Some(err) = failures.into_iter().next() {
            return Err(err);
        }

        let mut resolved = BTreeMap::new();
        for name in places {
            let coords = cache.get(name).ok_or_else(|| PlannerError::Geocoding {
                place: name.clone(),
                source: ServiceError::Malformed("resolved coordinate missing from cache".to_string()),
            })?;
            resolved.insert(name.clone(), coords);
        }
        Ok(resolved)
    }

    fn resolve_one(
        &self,
        name: &str,
        city: &str,
        alt_addresses: &BTreeMap<String, String>,
        cache: &GeocodeCache,
    ) -> Result<(), PlannerError> {
        if cache.contains(name) {
            return Ok(());
        }
        let probes = self.probes(name, city, alt_addresses);
        let mut last = None;
        for probe in &probes {
            match self.retry.run(|| self.api.lookup(probe)) {
                Ok(coords) => {
                    debug!(place = name, probe = probe.as_str(), "geocoded");
                    // Keyed by the place name, not the probe that matched.
                    cache.insert(name.to_string(), coords);
                    return Ok(());
                }
                Err(err) => {
                    debug!(place = name, probe = probe.as_str(), error = %err, "probe failed");
                    last = Some(err);
                    thread::sleep(self.probe_delay);
                }
            }
        }
        Err(PlannerError::Geocoding {
            place: name.to_string(),
            source: last
                .unwrap_or_else(|| ServiceError::Malformed("no probes generated".to_string())),
        })
    }

    fn probes(&self, name: &str, city: &str, alt_addresses: &BTreeMap<String, String>) -> Vec<String> {
        let primary = alt_addresses
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string());
        let mut probes = vec![primary];
        if !probes[0].contains(city) {
            probes.push(format!("{name}, {city}"));
        }
        probes.push(format!("{name}, {city}, {}", self.country));
        probes.push(format!("{}, {city}", strip_accents(name)));
        probes
    }
}
