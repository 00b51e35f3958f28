//! Day-bucket assignment by nearest mandatory-stop centroid.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::PlannerError;
use crate::haversine::haversine_distance_m;

/// Arithmetic mean of latitudes and longitudes. A city-scale approximation;
/// `None` for an empty slice.
pub fn centroid(coords: &[(f64, f64)]) -> Option<(f64, f64)> {
    if coords.is_empty() {
        return None;
    }
    let n = coords.len() as f64;
    let lat = coords.iter().map(|c| c.0).sum::<f64>() / n;
    let lng = coords.iter().map(|c| c.1).sum::<f64>() / n;
    Some((lat, lng))
}

/// Partitions every place into exactly one day bucket.
///
/// Each bucket starts as its configured mandatory list; the bucket's anchor
/// is the centroid of those mandatory coordinates. Every other place except
/// home joins the bucket whose anchor is haversine-nearest. Ties resolve to
/// the lowest day key. Home is left out here and re-inserted as the first
/// stop of every bucket downstream.
pub fn assign_days(
    coords: &BTreeMap<String, (f64, f64)>,
    mandatory_by_day: &BTreeMap<String, Vec<String>>,
    home: &str,
) -> Result<BTreeMap<String, Vec<String>>, PlannerError> {
    let mut days: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut anchors: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for (day, mandatory) in mandatory_by_day {
        let mut anchor_coords = Vec::with_capacity(mandatory.len());
        for place in mandatory {
            let coord = coords.get(place).ok_or_else(|| {
                PlannerError::Config(format!(
                    "mandatory place '{place}' for day {day} has no resolved coordinates"
                ))
            })?;
            anchor_coords.push(*coord);
        }
        let anchor = centroid(&anchor_coords).ok_or_else(|| {
            PlannerError::Config(format!("day {day} has no mandatory places"))
        })?;
        anchors.insert(day.clone(), anchor);
        days.insert(day.clone(), mandatory.clone());
    }

    for (place, coord) in coords {
        if place == home || days.values().any(|bucket| bucket.contains(place)) {
            continue;
        }
        // Strictly-closer over ascending keys keeps ties on the lowest key.
        let mut best: Option<(&str, u32)> = None;
        for (day, anchor) in &anchors {
            let distance = haversine_distance_m(*coord, *anchor);
            if best.is_none_or(|(_, closest)| distance < closest) {
                best = Some((day.as_str(), distance));
            }
        }
        if let Some((day, distance)) = best {
            debug!(place = %place, day, distance, "assigned to nearest day");
            if let Some(bucket) = days.get_mut(day) {
                bucket.push(place.clone());
            }
        }
    }
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords_fixture() -> BTreeMap<String, (f64, f64)> {
        let mut coords = BTreeMap::new();
        coords.insert("Hotel".to_string(), (48.86, 2.33));
        coords.insert("North Museum".to_string(), (48.90, 2.33));
        coords.insert("North Cafe".to_string(), (48.89, 2.34));
        coords.insert("South Park".to_string(), (48.80, 2.33));
        coords.insert("South Market".to_string(), (48.81, 2.32));
        coords
    }

    fn mandatory_fixture() -> BTreeMap<String, Vec<String>> {
        let mut mandatory = BTreeMap::new();
        mandatory.insert("1".to_string(), vec!["North Museum".to_string()]);
        mandatory.insert("2".to_string(), vec!["South Park".to_string()]);
        mandatory
    }

    #[test]
    fn test_centroid_mean() {
        let center = centroid(&[(48.0, 2.0), (50.0, 4.0)]).unwrap();
        assert_eq!(center, (49.0, 3.0));
    }

    #[test]
    fn test_centroid_empty_is_none() {
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn test_every_place_lands_in_one_bucket() {
        let days = assign_days(&coords_fixture(), &mandatory_fixture(), "Hotel").unwrap();
        let mut seen = Vec::new();
        for bucket in days.values() {
            for place in bucket {
                assert!(!seen.contains(place), "{place} assigned twice");
                seen.push(place.clone());
            }
        }
        assert_eq!(seen.len(), 4);
        assert!(!seen.contains(&"Hotel".to_string()), "home is excluded");
    }

    #[test]
    fn test_mandatory_places_stay_on_their_day() {
        let days = assign_days(&coords_fixture(), &mandatory_fixture(), "Hotel").unwrap();
        assert!(days["1"].contains(&"North Museum".to_string()));
        assert!(days["2"].contains(&"South Park".to_string()));
    }

    #[test]
    fn test_places_join_nearest_anchor() {
        let days = assign_days(&coords_fixture(), &mandatory_fixture(), "Hotel").unwrap();
        assert!(days["1"].contains(&"North Cafe".to_string()));
        assert!(days["2"].contains(&"South Market".to_string()));
    }

    #[test]
    fn test_tie_goes_to_lowest_day_key() {
        let mut coords = BTreeMap::new();
        coords.insert("Hotel".to_string(), (48.86, 2.33));
        coords.insert("East".to_string(), (48.86, 2.43));
        coords.insert("West".to_string(), (48.86, 2.23));
        // Exactly halfway between the two anchors.
        coords.insert("Middle".to_string(), (48.86, 2.33));

        let mut mandatory = BTreeMap::new();
        mandatory.insert("1".to_string(), vec!["East".to_string()]);
        mandatory.insert("2".to_string(), vec!["West".to_string()]);

        let days = assign_days(&coords, &mandatory, "Hotel").unwrap();
        assert!(days["1"].contains(&"Middle".to_string()));
    }

    #[test]
    fn test_unresolved_mandatory_place_is_config_error() {
        let coords = coords_fixture();
        let mut mandatory = BTreeMap::new();
        mandatory.insert("1".to_string(), vec!["Atlantis".to_string()]);
        assert!(matches!(
            assign_days(&coords, &mandatory, "Hotel"),
            Err(PlannerError::Config(_))
        ));
    }
}
