//! Validated planner configuration.
//!
//! Configuration files are parsed by an outer collaborator; this module only
//! defines the deserialized shape, the documented defaults, and one-shot
//! validation at the boundary.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::PlannerError;

/// How travel cost between two places is measured.
///
/// `Direct` is computed analytically and never touches the directions
/// service; every other mode is passed through to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Direct,
    Walking,
    Transit,
    Driving,
    Bicycling,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Direct => "direct",
            TravelMode::Walking => "walking",
            TravelMode::Transit => "transit",
            TravelMode::Driving => "driving",
            TravelMode::Bicycling => "bicycling",
        }
    }

    /// True when no directions service is involved.
    pub fn is_direct(&self) -> bool {
        matches!(self, TravelMode::Direct)
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Global tunables shared by every city.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    /// Credential for the geocoding/directions services. Injected here so
    /// clients never read the process environment themselves.
    pub api_key: String,
    /// Country appended to the third geocoding probe.
    pub country: String,
    /// Maximum number of requests in flight at once.
    pub rate_limit_qps: usize,
    /// Per-request timeout in seconds.
    pub http_timeout_s: u64,
    /// Pause between failed probes for one place, in seconds.
    pub probe_delay_s: f64,
    /// Time budget handed to the tour solver, in seconds.
    pub tsp_time_limit_s: u64,
    pub geocode_cache_file: PathBuf,
    pub directions_cache_file: PathBuf,
    /// Fraction of travel time spent on transit.
    pub transit_time: f64,
    pub transit_speed_kmh: f64,
    /// Fraction of travel time spent walking.
    pub walking_time: f64,
    pub walking_speed_kmh: f64,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            country: "France".to_string(),
            rate_limit_qps: 50,
            http_timeout_s: 6,
            probe_delay_s: 0.02,
            tsp_time_limit_s: 6,
            geocode_cache_file: PathBuf::from("geocode_cache.json"),
            directions_cache_file: PathBuf::from("directions_cache.json"),
            transit_time: 0.5,
            transit_speed_kmh: 30.0,
            walking_time: 0.5,
            walking_speed_kmh: 5.0,
        }
    }
}

impl PlannerSettings {
    /// Effective average speed when a city does not override it.
    ///
    /// Weighted harmonic mean of the transit and walking legs:
    /// `1 / (t_transit / v_transit + t_walk / v_walk)`.
    pub fn avg_speed_kmh(&self) -> f64 {
        1.0 / (self.transit_time / self.transit_speed_kmh
            + self.walking_time / self.walking_speed_kmh)
    }
}

/// One city's planning input.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CityConfig {
    /// Start (and implicit end) point of every route. Required.
    pub home: String,
    pub places: Vec<String>,
    /// Day key -> places that must be visited on that day.
    pub mandatory_by_day: BTreeMap<String, Vec<String>>,
    /// Place name -> override geocoding query, tried before generated probes.
    pub alt_addresses: BTreeMap<String, String>,
    pub mode: TravelMode,
    /// Overrides the speed model when set.
    pub avg_speed_kmh: Option<f64>,
}

impl CityConfig {
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.home.is_empty() {
            return Err(PlannerError::Config("city has no home place".to_string()));
        }
        for (day, mandatory) in &self.mandatory_by_day {
            if mandatory.is_empty() {
                return Err(PlannerError::Config(format!(
                    "day {day} has an empty mandatory list"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = PlannerSettings::default();
        assert_eq!(settings.rate_limit_qps, 50);
        assert_eq!(settings.http_timeout_s, 6);
        assert_eq!(settings.geocode_cache_file, PathBuf::from("geocode_cache.json"));
    }

    #[test]
    fn test_avg_speed_is_harmonic_mean() {
        let settings = PlannerSettings::default();
        // 1 / (0.5/30 + 0.5/5) = 1 / 0.11666... ~ 8.571 km/h
        let speed = settings.avg_speed_kmh();
        assert!((speed - 8.5714).abs() < 0.001, "got {speed}");
    }

    #[test]
    fn test_mode_round_trip() {
        let mode: TravelMode = serde_json::from_str("\"walking\"").unwrap();
        assert_eq!(mode, TravelMode::Walking);
        assert_eq!(mode.as_str(), "walking");
        assert!(!mode.is_direct());
        assert!(TravelMode::default().is_direct());
    }

    #[test]
    fn test_validate_rejects_missing_home() {
        let city = CityConfig::default();
        assert!(city.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_mandatory_day() {
        let mut city = CityConfig {
            home: "Hotel".to_string(),
            ..CityConfig::default()
        };
        city.mandatory_by_day.insert("1".to_string(), Vec::new());
        assert!(city.validate().is_err());
    }
}
