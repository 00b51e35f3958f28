//! N×N travel-cost matrix construction.
//!
//! `direct` mode is computed analytically from great-circle distances; every
//! other mode batch-queries the directions service for unordered pairs not
//! already in the cache. Either way the result is symmetric with a zero
//! diagonal.

use tracing::debug;

use crate::cache::DirectionsCache;
use crate::config::TravelMode;
use crate::directions::DirectionsClient;
use crate::error::PlannerError;
use crate::haversine::haversine_distance_m;

/// Square, symmetric, zero-diagonal cost matrix in meters.
pub type DistanceMatrix = Vec<Vec<u32>>;

/// Cache key for one unordered coordinate pair and mode.
pub fn cache_key(origin: (f64, f64), destination: (f64, f64), mode: TravelMode) -> String {
    format!(
        "{},{}|{},{}|{}",
        origin.0, origin.1, destination.0, destination.1, mode
    )
}

/// Analytic matrix for the `direct` mode: no network, no cache.
pub fn direct_matrix(coords: &[(f64, f64)]) -> DistanceMatrix {
    let n = coords.len();
    let mut matrix = vec![vec![0u32; n]; n];
    for i in 0..n {
        for j in 0..n {
            if i != j {
                matrix[i][j] = haversine_distance_m(coords[i], coords[j]);
            }
        }
    }
    matrix
}

/// Builds matrices over a [`DirectionsClient`], reusing cached pairs.
pub struct DistanceMatrixBuilder<'a> {
    directions: &'a DirectionsClient,
}

impl<'a> DistanceMatrixBuilder<'a> {
    pub fn new(directions: &'a DirectionsClient) -> Self {
        Self { directions }
    }

    /// Builds the matrix for `coords` under `mode`.
    ///
    /// Cache misses are fetched concurrently; each success fills both (i, j)
    /// and (j, i) and is inserted into `cache`. Persisting the cache is the
    /// caller's responsibility once the batch returns, so partial progress
    /// survives a failed sibling even though the build itself fails with the
    /// first pair error.
    pub fn build(
        &self,
        coords: &[(f64, f64)],
        mode: TravelMode,
        cache: &DirectionsCache,
    ) -> Result<DistanceMatrix, PlannerError> {
        if mode.is_direct() {
            return Ok(direct_matrix(coords));
        }

        let n = coords.len();
        let mut matrix = vec![vec![0u32; n]; n];
        let mut misses = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                match cache.get(&cache_key(coords[i], coords[j], mode)) {
                    Some(distance) => {
                        matrix[i][j] = distance;
                        matrix[j][i] = distance;
                    }
                    None => misses.push((i, j)),
                }
            }
        }
        if misses.is_empty() {
            debug!("all directions found in cache");
            return Ok(matrix);
        }
        debug!(misses = misses.len(), "directions cache misses");

        let pairs: Vec<((f64, f64), (f64, f64))> = misses
            .iter()
            .map(|&(i, j)| (coords[i], coords[j]))
            .collect();
        let results = self.directions.distances(&pairs, mode);

        let mut first_error = None;
        for (&(i, j), result) in misses.iter().zip(results) {
            match result {
                Ok(distance) => {
                    matrix[i][j] = distance;
                    matrix[j][i] = distance;
                    cache.insert(cache_key(coords[i], coords[j], mode), distance);
                }
                Err(source) => {
                    if first_error.is_none() {
                        first_error = Some(PlannerError::Directions {
                            origin: coords[i],
                            destination: coords[j],
                            source,
                        });
                    }
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(matrix),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_matrix_diagonal_is_zero() {
        let coords = vec![(48.86, 2.33), (48.85, 2.29), (48.84, 2.35)];
        let matrix = direct_matrix(&coords);
        for (i, row) in matrix.iter().enumerate() {
            assert_eq!(row[i], 0);
        }
    }

    #[test]
    fn test_direct_matrix_symmetric() {
        let coords = vec![(48.86, 2.33), (48.85, 2.29), (48.84, 2.35)];
        let matrix = direct_matrix(&coords);
        for i in 0..coords.len() {
            for j in 0..coords.len() {
                assert_eq!(matrix[i][j], matrix[j][i]);
            }
        }
    }

    #[test]
    fn test_direct_matrix_matches_haversine() {
        let a = (48.8606, 2.3376);
        let b = (48.8584, 2.2945);
        let matrix = direct_matrix(&[a, b]);
        assert_eq!(matrix[0][1], haversine_distance_m(a, b));
    }

    #[test]
    fn test_cache_key_format() {
        let key = cache_key((48.86, 2.33), (48.85, 2.29), TravelMode::Walking);
        assert_eq!(key, "48.86,2.33|48.85,2.29|walking");
    }

    #[test]
    fn test_empty_coords() {
        assert!(direct_matrix(&[]).is_empty());
    }
}
