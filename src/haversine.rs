//! Great-circle distance on the mean Earth sphere.
//!
//! Used for the `direct` travel mode and for day-bucket proximity.
//! Ignores roads, so it underestimates real travel distance.

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_008.0;

/// Haversine distance between two (latitude, longitude) points, in meters,
/// truncated to a whole meter.
pub fn haversine_distance_m(from: (f64, f64), to: (f64, f64)) -> u32 {
    let (lat1, lng1) = (from.0.to_radians(), from.1.to_radians());
    let (lat2, lng2) = (to.0.to_radians(), to.1.to_radians());

    let dlat = lat2 - lat1;
    let dlng = lng2 - lng1;

    let hav = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    let distance = EARTH_RADIUS_M * 2.0 * hav.sqrt().atan2((1.0 - hav).sqrt());
    distance as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point_is_zero() {
        assert_eq!(haversine_distance_m((48.86, 2.33), (48.86, 2.33)), 0);
    }

    #[test]
    fn test_known_distance() {
        // Paris (48.8566, 2.3522) to Lyon (45.7640, 4.8357), ~392 km.
        let dist = haversine_distance_m((48.8566, 2.3522), (45.7640, 4.8357));
        assert!((380_000..400_000).contains(&dist), "got {dist}");
    }

    #[test]
    fn test_symmetric() {
        let a = (48.8606, 2.3376);
        let b = (48.8584, 2.2945);
        assert_eq!(haversine_distance_m(a, b), haversine_distance_m(b, a));
    }

    #[test]
    fn test_short_hop_is_meters_not_kilometers() {
        // Louvre to Palais Royal, a few hundred meters.
        let dist = haversine_distance_m((48.8606, 2.3376), (48.8637, 2.3371));
        assert!((100..1_000).contains(&dist), "got {dist}");
    }
}
