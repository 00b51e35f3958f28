//! Route planning orchestration.
//!
//! Glues the pipeline together per city: caches, geocoding, day assignment,
//! matrix construction and the external solver, producing one
//! [`RouteResult`] per day bucket (or one for the whole city).

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::cache::{DirectionsCache, GeocodeCache};
use crate::config::{CityConfig, PlannerSettings, TravelMode};
use crate::days::assign_days;
use crate::directions::{DirectionsClient, DirectionsConfig};
use crate::error::PlannerError;
use crate::geocode::{GeocoderConfig, GeocodingClient};
use crate::matrix::{DistanceMatrix, DistanceMatrixBuilder};
use crate::solver::{RouteSolver, validate_tour};

/// One solved route, ready for text, map or JSON presentation.
#[derive(Debug, Clone, Serialize)]
pub struct RouteResult {
    pub city: String,
    /// Working place list; `route` indexes into it.
    pub places: Vec<String>,
    pub coords: BTreeMap<String, (f64, f64)>,
    pub speed_kmh: f64,
    /// Day key for multi-day plans, `None` for a single-bucket plan.
    pub day: Option<String>,
    /// Visiting order: a permutation of place indices starting at home.
    pub route: Vec<usize>,
    pub header: String,
    pub distance_matrix: DistanceMatrix,
    pub mode: TravelMode,
}

impl RouteResult {
    /// Total length of the tour's edges, in meters.
    pub fn total_distance_m(&self) -> u64 {
        self.route
            .windows(2)
            .map(|pair| u64::from(self.distance_matrix[pair[0]][pair[1]]))
            .sum()
    }

    /// Travel time estimate at the effective average speed.
    pub fn total_time_minutes(&self) -> f64 {
        travel_time_minutes(self.total_distance_m(), self.speed_kmh)
    }

    /// Place names in visiting order.
    pub fn ordered_places(&self) -> Vec<&str> {
        self.route
            .iter()
            .map(|&index| self.places[index].as_str())
            .collect()
    }

    /// Text rendering: header, stops in order, distance/time footer.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.header);
        for name in self.ordered_places() {
            out.push('\n');
            out.push_str(name);
        }
        let _ = write!(
            out,
            "\n{:.1} km | {:.0} min",
            self.total_distance_m() as f64 / 1000.0,
            self.total_time_minutes()
        );
        out
    }
}

/// Minutes needed to cover `distance_m` at `speed_kmh`.
pub fn travel_time_minutes(distance_m: u64, speed_kmh: f64) -> f64 {
    distance_m as f64 / 1000.0 / speed_kmh * 60.0
}

/// Collapses duplicates keeping first-seen order, and forces `home` to the
/// front when it is not already listed.
pub fn dedupe_places(home: &str, places: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut working = Vec::with_capacity(places.len());
    for place in places {
        if seen.insert(place.as_str()) {
            working.push(place.clone());
        }
    }
    if !working.iter().any(|place| place == home) {
        working.insert(0, home.to_string());
    }
    working
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Per-request pipeline front end.
pub struct RoutePlanner {
    settings: PlannerSettings,
    geocoder: GeocodingClient,
    directions: DirectionsClient,
    solver: Box<dyn RouteSolver>,
    workers: usize,
}

impl RoutePlanner {
    pub fn new(
        settings: PlannerSettings,
        solver: Box<dyn RouteSolver>,
        workers: usize,
    ) -> Result<Self, PlannerError> {
        let geocoder = GeocodingClient::new(GeocoderConfig::from_settings(&settings))?;
        let directions = DirectionsClient::new(DirectionsConfig::from_settings(&settings))?;
        Ok(Self::with_clients(settings, geocoder, directions, solver, workers))
    }

    /// Assembles a planner from prebuilt clients; test seam.
    pub fn with_clients(
        settings: PlannerSettings,
        geocoder: GeocodingClient,
        directions: DirectionsClient,
        solver: Box<dyn RouteSolver>,
        workers: usize,
    ) -> Self {
        Self {
            settings,
            geocoder,
            directions,
            solver,
            workers,
        }
    }

    /// Plans one city: one result per day bucket, sorted by day key, or a
    /// single result when no mandatory-by-day map is configured.
    ///
    /// A geocoding failure for any place aborts the whole run; coordinates
    /// resolved before the failure are still persisted to the cache file.
    pub fn plan(&self, city_name: &str, city: &CityConfig) -> Result<Vec<RouteResult>, PlannerError> {
        city.validate()?;

        let geocode_cache = GeocodeCache::load(&self.settings.geocode_cache_file)?;
        let places = dedupe_places(&city.home, &city.places);
        let resolved = self
            .geocoder
            .resolve(&places, city_name, &city.alt_addresses, &geocode_cache);
        geocode_cache.save(&self.settings.geocode_cache_file)?;
        let coords = resolved?;

        let speed_kmh = city
            .avg_speed_kmh
            .unwrap_or_else(|| self.settings.avg_speed_kmh());
        let time_limit = Duration::from_secs(self.settings.tsp_time_limit_s);
        let directions_cache = DirectionsCache::load(&self.settings.directions_cache_file)?;
        let builder = DistanceMatrixBuilder::new(&self.directions);

        let solve_bucket = |bucket: Vec<String>,
                            day: Option<String>,
                            header: String|
         -> Result<RouteResult, PlannerError> {
            let bucket_coords = bucket
                .iter()
                .map(|place| {
                    coords.get(place).copied().ok_or_else(|| {
                        PlannerError::Config(format!("place '{place}' has no resolved coordinates"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let matrix = builder.build(&bucket_coords, city.mode, &directions_cache);
            if !city.mode.is_direct() {
                // Keep whatever pairs did resolve, even when the batch failed.
                directions_cache.save(&self.settings.directions_cache_file)?;
            }
            let matrix = matrix?;

            let home_index = bucket
                .iter()
                .position(|place| place == &city.home)
                .ok_or_else(|| {
                    PlannerError::Config(format!("home '{}' missing from bucket", city.home))
                })?;
            let route = self
                .solver
                .solve(&matrix, home_index, self.workers, time_limit)?;
            validate_tour(&route, bucket.len(), home_index)?;

            Ok(RouteResult {
                city: city_name.to_string(),
                places: bucket,
                coords: coords.clone(),
                speed_kmh,
                day,
                route,
                header,
                distance_matrix: matrix,
                mode: city.mode,
            })
        };

        let mut results = Vec::new();
        if city.mandatory_by_day.is_empty() {
            let header = format!("\n{}", city_name.to_uppercase());
            results.push(solve_bucket(places, None, header)?);
        } else {
            let days = assign_days(&coords, &city.mandatory_by_day, &city.home)?;
            for (day, bucket) in &days {
                let day_places = dedupe_places(&city.home, bucket);
                let mandatory = city
                    .mandatory_by_day
                    .get(day)
                    .map(|list| list.join(", "))
                    .unwrap_or_default();
                let header = format!(
                    "\n{} - Day {day}\nMust: {mandatory}",
                    capitalize(city_name)
                );
                results.push(solve_bucket(day_places, Some(day.clone()), header)?);
            }
        }
        info!(city = city_name, routes = results.len(), "planning complete");
        Ok(results)
    }
}
