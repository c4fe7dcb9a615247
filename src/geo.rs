//! Great-circle distance helpers

use haversine::{Location as HaversineLocation, Units, distance as haversine_distance};

use crate::models::Coordinate;

/// Mean Earth radius used by the haversine crate's kilometer unit, in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

fn to_haversine(coordinate: &Coordinate) -> HaversineLocation {
    HaversineLocation {
        latitude: coordinate.latitude,
        longitude: coordinate.longitude,
    }
}

/// Haversine distance in meters; 0 when either side is absent.
#[must_use]
pub fn distance(from: &Coordinate, to: &Coordinate) -> f64 {
    if from.is_absent() || to.is_absent() {
        return 0.0;
    }
    haversine_distance(to_haversine(from), to_haversine(to), Units::Kilometers) * 1000.0
}

/// Running path length at each point, starting at 0 (meters, unrounded)
#[must_use]
pub fn cumulative_distances(points: &[Coordinate]) -> Vec<f64> {
    let mut total = 0.0;
    let mut distances = Vec::with_capacity(points.len());
    for (i, point) in points.iter().enumerate() {
        if i > 0 {
            total += distance(&points[i - 1], point);
        }
        distances.push(total);
    }
    distances
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRAGUE: Coordinate = Coordinate::new(50.0755, 14.4378);
    const BRNO: Coordinate = Coordinate::new(49.1951, 16.6068);

    #[test]
    fn test_distance_to_self_is_zero() {
        assert_eq!(distance(&PRAGUE, &PRAGUE), 0.0);
        assert_eq!(distance(&BRNO, &BRNO), 0.0);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let a = Coordinate::new(10.0, 20.0);
        let b = Coordinate::new(11.0, 20.0);
        let expected = EARTH_RADIUS_M * 1f64.to_radians();
        assert!((distance(&a, &b) - expected).abs() < 1.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let there = distance(&PRAGUE, &BRNO);
        let back = distance(&BRNO, &PRAGUE);
        assert!((there - back).abs() < 1e-6);
        // Prague to Brno is roughly 185 km as the crow flies
        assert!((180_000.0..190_000.0).contains(&there));
    }

    #[test]
    fn test_absent_coordinate_yields_zero() {
        assert_eq!(distance(&PRAGUE, &Coordinate::new(0.0, 0.0)), 0.0);
        assert_eq!(distance(&Coordinate::new(f64::NAN, 1.0), &BRNO), 0.0);
    }

    #[test]
    fn test_cumulative_distances() {
        let points = [
            Coordinate::new(10.0, 20.0),
            Coordinate::new(11.0, 20.0),
            Coordinate::new(12.0, 20.0),
        ];
        let distances = cumulative_distances(&points);
        assert_eq!(distances.len(), 3);
        assert_eq!(distances[0], 0.0);
        assert!((distances[2] - 2.0 * distances[1]).abs() < 1.0);
        assert!(cumulative_distances(&[]).is_empty());
    }
}
