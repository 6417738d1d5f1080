//! # Geographic Utilities
//!
//! Geographic computations shared by the road search, the intersection logic and
//! the geocoder.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two GPS points |
//! | [`bearing`] | Initial compass bearing from one point to another |
//! | [`destination`] | Point reached by travelling a distance on a bearing |
//! | [`path_distance`] | Total length of a path in meters |
//! | [`reference_coordinate`] | Point at a distance along a path |
//! | [`path_bearing`] | Bearing of a path with bounded lookahead |
//! | [`path_is_circular`] | Whether a path is a "close" |
//! | [`coordinates_equal`] | Tolerant coordinate equality |
//! | [`relative_bearing`] | Clockwise angle from a heading to a bearing |
//! | [`angle_difference`] | Signed smallest difference between two angles |
//!
//! All functions expect WGS84 coordinates (latitude/longitude in degrees).

use geo::{Bearing, Destination, Distance, Haversine};

use crate::GpsPoint;

/// Lookahead used when measuring the bearing of a road leaving an intersection.
/// Long roads curve; only the first stretch matters for "which way does it go".
pub const MAX_ROAD_DISTANCE_FOR_BEARING: f64 = 25.0;

/// Coordinates closer than this (in degrees, per axis) are the same map vertex.
pub const COORDINATE_EQUALITY_THRESHOLD: f64 = 0.000_000_9;

/// Meters per degree of latitude (approximately constant).
const METERS_PER_DEGREE: f64 = 111_320.0;

// =============================================================================
// Distance Functions
// =============================================================================

/// Calculate the great-circle distance between two GPS points, in meters.
///
/// # Example
/// ```
/// use roadside::GpsPoint;
/// use roadside::geo_utils::haversine_distance;
///
/// let a = GpsPoint::new(51.5074, -0.1278);
/// let b = GpsPoint::new(51.5084, -0.1278);
/// let d = haversine_distance(&a, &b);
/// assert!((d - 111.2).abs() < 1.0);
/// ```
pub fn haversine_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    Haversine.distance(p1.to_geo(), p2.to_geo())
}

/// Total length of a path in meters. Paths with fewer than 2 points have length 0.
pub fn path_distance(path: &[GpsPoint]) -> f64 {
    path.windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Convert a distance in meters to (latitude, longitude) degree offsets at a latitude.
pub fn meters_to_degrees(meters: f64, latitude: f64) -> (f64, f64) {
    let dlat = meters / METERS_PER_DEGREE;
    let cos_lat = latitude.to_radians().cos().abs().max(1e-6);
    let dlng = meters / (METERS_PER_DEGREE * cos_lat);
    (dlat, dlng)
}

// =============================================================================
// Bearings
// =============================================================================

/// Initial compass bearing (degrees in [0, 360)) from `from` to `to`.
///
/// Returns `None` if either coordinate is invalid, and 0 if they are the same
/// location.
pub fn bearing(from: &GpsPoint, to: &GpsPoint) -> Option<f64> {
    if !from.is_valid() || !to.is_valid() {
        return None;
    }
    if coordinates_equal(from, to) {
        return Some(0.0);
    }
    Some(normalize_degrees(Haversine.bearing(from.to_geo(), to.to_geo())))
}

/// The point reached from `origin` after travelling `distance` meters on `bearing`.
pub fn destination(origin: &GpsPoint, distance: f64, bearing: f64) -> GpsPoint {
    Haversine
        .destination(origin.to_geo(), bearing, distance)
        .into()
}

/// The point `distance` meters from `from` in the direction of `to`.
pub fn coordinate_between(from: &GpsPoint, to: &GpsPoint, distance: f64) -> GpsPoint {
    match bearing(from, to) {
        Some(b) => destination(from, distance, b),
        None => *from,
    }
}

/// Normalize an angle in degrees into [0, 360).
pub fn normalize_degrees(degrees: f64) -> f64 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if normalized >= 360.0 { 0.0 } else { normalized }
}

/// The clockwise angle from `heading` to `bearing`, in [0, 360).
///
/// - 45°, bearing 135° => 90°
/// - 315°, bearing 15° => 60°
pub fn relative_bearing(heading: f64, bearing: f64) -> f64 {
    normalize_degrees(bearing - heading)
}

/// Signed smallest difference `to - from`, in (-180, 180].
pub fn angle_difference(from: f64, to: f64) -> f64 {
    let diff = relative_bearing(from, to);
    if diff > 180.0 { diff - 360.0 } else { diff }
}

// =============================================================================
// Paths
// =============================================================================

/// Tolerant equality for map coordinates.
///
/// Intersections and road vertices come from different parts of the tile data and
/// can differ in the last few decimal places.
pub fn coordinates_equal(a: &GpsPoint, b: &GpsPoint) -> bool {
    (a.latitude - b.latitude).abs() <= COORDINATE_EQUALITY_THRESHOLD
        && (a.longitude - b.longitude).abs() <= COORDINATE_EQUALITY_THRESHOLD
}

/// Whether a path is circular: more than 2 points and the first equals the last.
pub fn path_is_circular(path: &[GpsPoint]) -> bool {
    match (path.first(), path.last()) {
        (Some(first), Some(last)) if path.len() > 2 => coordinates_equal(first, last),
        _ => false,
    }
}

/// The point on `path` at `target_distance` meters from its first coordinate.
///
/// - A target beyond the end of the path yields the last coordinate.
/// - A target between two coordinates yields a synthesized point between them.
/// - A target of zero or less yields the first coordinate.
pub fn reference_coordinate(path: &[GpsPoint], target_distance: f64) -> Option<GpsPoint> {
    let first = *path.first()?;

    if path.len() == 1 || target_distance <= 0.0 {
        return Some(first);
    }

    let mut total = 0.0;
    for w in path.windows(2) {
        let segment = haversine_distance(&w[0], &w[1]);
        total += segment;

        if total == target_distance {
            return Some(w[1]);
        }

        if total > target_distance {
            let remaining = target_distance - (total - segment);
            return Some(coordinate_between(&w[0], &w[1], remaining));
        }
    }

    path.last().copied()
}

/// Bearing from the first coordinate of `path` to the point `max_distance` meters
/// along it (or its last coordinate if the path is shorter).
///
/// ```text
/// A * *          - (A) first coordinate
///     * * *
///       ↘ *      - bearing from A to B
///         B      - (B) point at max_distance
///         * * C  - (C) last coordinate
/// ```
pub fn path_bearing(path: &[GpsPoint], max_distance: f64) -> Option<f64> {
    let first = path.first()?;
    let reference = reference_coordinate(path, max_distance)?;
    bearing(first, &reference)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(720.0), 0.0);
        assert_eq!(normalize_degrees(45.0), 45.0);
    }

    #[test]
    fn test_angle_difference_wraps() {
        assert!((angle_difference(350.0, 10.0) - 20.0).abs() < 1e-9);
        assert!((angle_difference(10.0, 350.0) + 20.0).abs() < 1e-9);
        assert!((angle_difference(0.0, 180.0) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_reference_coordinate_short_path_returns_last() {
        let path = vec![GpsPoint::new(51.5, -0.1), GpsPoint::new(51.5001, -0.1)];
        let reference = reference_coordinate(&path, 1_000.0).unwrap();
        assert_eq!(reference, path[1]);
    }
}
