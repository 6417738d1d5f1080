//! Web-Mercator pixel projection.
//!
//! The nearest-road search runs on every location update over every segment of
//! every nearby road, so it avoids spherical trigonometry in the inner loop. Points
//! are projected into the Web-Mercator pixel grid at a fixed level of detail, where
//! the local geometry is linear, and squared pixel distances are converted to
//! meters once at the end using the ground resolution at the query latitude.

use crate::GpsPoint;

/// Level of detail used for distance computations. At zoom 23 one pixel is about
/// 1.9 cm at the equator.
pub const SEARCH_ZOOM: u32 = 23;

const EARTH_RADIUS: f64 = 6_378_137.0;
const MIN_LATITUDE: f64 = -85.051_128_78;
const MAX_LATITUDE: f64 = 85.051_128_78;
const MIN_LONGITUDE: f64 = -180.0;
const MAX_LONGITUDE: f64 = 180.0;

/// A point in the pixel grid at some level of detail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

/// Side length of the map in pixels at a zoom level.
pub fn map_size(zoom: u32) -> f64 {
    256.0 * 2f64.powi(zoom as i32)
}

/// Ground resolution (meters per pixel) at a latitude and zoom level.
pub fn ground_resolution(latitude: f64, zoom: u32) -> f64 {
    let lat = latitude.clamp(MIN_LATITUDE, MAX_LATITUDE);
    lat.to_radians().cos() * 2.0 * std::f64::consts::PI * EARTH_RADIUS / map_size(zoom)
}

/// Project a coordinate into the pixel grid.
pub fn to_pixel(point: &GpsPoint, zoom: u32) -> PixelPoint {
    let lat = point.latitude.clamp(MIN_LATITUDE, MAX_LATITUDE);
    let lon = point.longitude.clamp(MIN_LONGITUDE, MAX_LONGITUDE);

    let sin_lat = lat.to_radians().sin();
    let x = (lon + 180.0) / 360.0;
    let y = 0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * std::f64::consts::PI);

    let size = map_size(zoom);
    PixelPoint {
        x: (x * size).clamp(0.0, size - 1.0),
        y: (y * size).clamp(0.0, size - 1.0),
    }
}

/// Inverse of [`to_pixel`].
pub fn from_pixel(pixel: PixelPoint, zoom: u32) -> GpsPoint {
    let size = map_size(zoom);
    let x = pixel.x.clamp(0.0, size - 1.0) / size - 0.5;
    let y = 0.5 - pixel.y.clamp(0.0, size - 1.0) / size;

    let latitude = 90.0 - 360.0 * (-y * 2.0 * std::f64::consts::PI).exp().atan() / std::f64::consts::PI;
    let longitude = 360.0 * x;
    GpsPoint::new(latitude, longitude)
}

/// Squared pixel distance from `point` to the segment `start`-`end`, and the
/// closest point on that segment (the perpendicular foot, clamped to the segment).
pub fn segment_projection(
    point: PixelPoint,
    start: PixelPoint,
    end: PixelPoint,
) -> (f64, PixelPoint) {
    let ab_x = end.x - start.x;
    let ab_y = end.y - start.y;
    let length_sq = ab_x * ab_x + ab_y * ab_y;

    // Degenerate segment
    if length_sq == 0.0 {
        return (squared_distance(point, start), start);
    }

    let t = ((point.x - start.x) * ab_x + (point.y - start.y) * ab_y) / length_sq;
    let t = t.clamp(0.0, 1.0);
    let foot = PixelPoint {
        x: start.x + ab_x * t,
        y: start.y + ab_y * t,
    };

    (squared_distance(point, foot), foot)
}

/// Distance in meters from `point` to the segment `start`-`end`, with the snapped point.
pub fn distance_to_segment(point: &GpsPoint, start: &GpsPoint, end: &GpsPoint) -> (f64, GpsPoint) {
    let (dist_sq, foot) = segment_projection(
        to_pixel(point, SEARCH_ZOOM),
        to_pixel(start, SEARCH_ZOOM),
        to_pixel(end, SEARCH_ZOOM),
    );
    (
        dist_sq.sqrt() * ground_resolution(point.latitude, SEARCH_ZOOM),
        from_pixel(foot, SEARCH_ZOOM),
    )
}

pub(crate) fn squared_distance(a: PixelPoint, b: PixelPoint) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}
