//! Real Paris locations for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap. Close enough together that
//! centroid-based day assignment behaves the way it does at city scale.

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

/// Start point used as "home" across the suites.
pub const HOME: Location = Location::new("Hôtel du Louvre", 48.8635, 2.3353);

// ============================================================================
// Right bank / north (near Montmartre)
// ============================================================================

pub const NORTH_SIGHTS: &[Location] = &[
    Location::new("Sacré-Cœur", 48.8867, 2.3431),
    Location::new("Moulin Rouge", 48.8841, 2.3322),
    Location::new("Place du Tertre", 48.8865, 2.3406),
];

// ============================================================================
// Left bank / south (Latin Quarter and around)
// ============================================================================

pub const SOUTH_SIGHTS: &[Location] = &[
    Location::new("Panthéon", 48.8462, 2.3464),
    Location::new("Jardin du Luxembourg", 48.8466, 2.3372),
    Location::new("Notre-Dame", 48.8530, 2.3499),
];

// ============================================================================
// Central landmarks
// ============================================================================

pub const CENTRAL_SIGHTS: &[Location] = &[
    Location::new("Louvre", 48.8606, 2.3376),
    Location::new("Musée d'Orsay", 48.8600, 2.3266),
    Location::new("Eiffel Tower", 48.8584, 2.2945),
    Location::new("Arc de Triomphe", 48.8738, 2.2950),
    Location::new("Place des Vosges", 48.8559, 2.3655),
];

/// Every fixture location including home.
pub fn all_locations() -> Vec<Location> {
    let mut locations = vec![HOME.clone()];
    locations.extend(NORTH_SIGHTS.iter().cloned());
    locations.extend(SOUTH_SIGHTS.iter().cloned());
    locations.extend(CENTRAL_SIGHTS.iter().cloned());
    locations
}
