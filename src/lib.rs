//! # Roadside
//!
//! Direction-aware reverse geocoding for pedestrian navigation.
//!
//! This library turns a raw position and facing direction into one of three
//! announcement-ready descriptions:
//! - **Inside** a place (a building or other POI polygon)
//! - **Alongside** a road, optionally with the next significant intersection ahead
//! - **Generic**: near a road and/or POI, but not on either
//!
//! It provides:
//! - Nearest-road search in a projected pixel space with a "sticky" road for hysteresis
//! - Intersection significance classification (five independent heuristics)
//! - Heading-relative road directions at intersections
//! - A stateful [`ReverseGeocoder`] that combines these on every location update
//! - An in-memory [`MapRepository`] with R-tree backed snapshot queries
//!
//! ## Features
//!
//! - **`parallel`** - Batch waypoint snapping with rayon
//! - **`synthetic`** - Seeded synthetic street grids for tests and benchmarks
//! - **`cli`** - The `roadside-cli` debug tool
//!
//! ## Quick Start
//!
//! ```rust
//! use roadside::{GpsPoint, Heading, ReverseGeocoder, Road, SpatialSnapshot};
//!
//! let road = Road::new(
//!     "way-1",
//!     "Pike Street",
//!     "road",
//!     vec![GpsPoint::new(47.6100, -122.3400), GpsPoint::new(47.6100, -122.3380)],
//! );
//! let snapshot = SpatialSnapshot::new(vec![road], vec![], vec![]);
//!
//! let mut geocoder = ReverseGeocoder::default();
//! let here = GpsPoint::new(47.61005, -122.3390); // ~5m north of the road
//! let result = geocoder.reverse_geocode(here, &snapshot, Heading::new(90.0));
//!
//! assert!(result.is_alongside());
//! assert_eq!(geocoder.sticky_road().map(|s| s.name.as_str()), Some("Pike Street"));
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{GeocodeError, OptionExt, Result};

// Geographic utilities (distance, bearing, path helpers)
pub mod geo_utils;

// Web-Mercator pixel projection used by the nearest-road search
pub mod projection;

// Map features
pub mod poi;
pub mod road;
pub use poi::{Poi, PoiGeometry};
pub use road::Road;

// Road importance ("main road") policy
pub mod policy;
pub use policy::{RoadImportancePolicy, SecondaryRoadPolicy, SecondaryRoadsContext};

// Intersections: classification, filtering and relative road directions
pub mod intersection;
pub use intersection::direction::{Direction, RelativeDirectionType, RoadDirection};
pub use intersection::Intersection;

// Spatial data: per-call snapshots and the in-memory repository
pub mod repository;
pub mod snapshot;
pub use repository::MapRepository;
pub use snapshot::{RoadLookup, SnapshotProvider, SpatialSnapshot};

// Nearest road search with sticky road tracking
pub mod nearest_road;
pub use nearest_road::{NearbyRoadSearchResult, RoadMatch, find_nearest_roads};

// Reverse geocoding state machine
pub mod geocoder;
pub use geocoder::address::{Address, AddressEstimator, AddressHandle, AddressSender};
pub use geocoder::live::{Geocoded, HeadingSource, LiveGeocoder};
pub use geocoder::result::{AlongsideResult, GenericResult, InsideResult, ReverseGeocodeResult};
pub use geocoder::{GeocoderConfig, ReverseGeocoder, StickyRoad, closest_intersection, closest_intersections};

// Synthetic street grids for stress testing and benchmarking
#[cfg(feature = "synthetic")]
pub mod synthetic;

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use roadside::GpsPoint;
/// let point = GpsPoint::new(47.6097, -122.3331); // Seattle
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Create a GPS point, rejecting coordinates that are not valid WGS84 positions.
    pub fn validated(latitude: f64, longitude: f64) -> Result<Self> {
        let point = Self::new(latitude, longitude);
        if point.is_valid() {
            Ok(point)
        } else {
            Err(GeocodeError::InvalidCoordinate {
                latitude,
                longitude,
            })
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// Convert to a `geo` point (x = longitude, y = latitude).
    pub fn to_geo(&self) -> geo::Point<f64> {
        geo::Point::new(self.longitude, self.latitude)
    }

    /// Tolerant equality used to match road vertices with intersection coordinates.
    /// See [`geo_utils::coordinates_equal`].
    pub fn same_location(&self, other: &GpsPoint) -> bool {
        geo_utils::coordinates_equal(self, other)
    }
}

impl From<geo::Point<f64>> for GpsPoint {
    fn from(point: geo::Point<f64>) -> Self {
        GpsPoint::new(point.y(), point.x())
    }
}

impl std::fmt::Display for GpsPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// A compass heading in degrees clockwise from north, or unknown.
///
/// Sensor headings are frequently missing or garbage (NaN, negative "invalid"
/// markers). Rather than failing, an invalid value becomes an unknown heading,
/// which only disables the direction-dependent parts of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub struct Heading(Option<f64>);

impl Heading {
    /// An unknown heading.
    pub const UNKNOWN: Heading = Heading(None);

    /// Create a heading, degrading to [`Heading::UNKNOWN`] when `degrees` is not
    /// finite or outside [0, 360]. 360 is normalized to 0.
    pub fn new(degrees: f64) -> Self {
        if degrees.is_finite() && (0.0..=360.0).contains(&degrees) {
            Heading(Some(degrees % 360.0))
        } else {
            Heading(None)
        }
    }

    /// Create a heading, rejecting invalid values instead of degrading.
    pub fn try_new(degrees: f64) -> Result<Self> {
        match Heading::new(degrees) {
            Heading(None) => Err(GeocodeError::InvalidHeading { value: degrees }),
            heading => Ok(heading),
        }
    }

    /// The heading in degrees, `None` when unknown.
    pub fn value(&self) -> Option<f64> {
        self.0
    }

    /// Whether the heading is known.
    pub fn is_valid(&self) -> bool {
        self.0.is_some()
    }
}

impl From<Option<f64>> for Heading {
    fn from(value: Option<f64>) -> Self {
        value.map(Heading::new).unwrap_or(Heading::UNKNOWN)
    }
}

impl From<Heading> for Option<f64> {
    fn from(heading: Heading) -> Self {
        heading.0
    }
}

/// Bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from GPS points.
    pub fn from_points(points: &[GpsPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for p in points {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lng = min_lng.min(p.longitude);
            max_lng = max_lng.max(p.longitude);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// Square bounds extending `radius_meters` in every direction from `center`.
    pub fn around(center: GpsPoint, radius_meters: f64) -> Self {
        let (dlat, dlng) = geo_utils::meters_to_degrees(radius_meters, center.latitude);
        Self {
            min_lat: center.latitude - dlat,
            max_lat: center.latitude + dlat,
            min_lng: center.longitude - dlng,
            max_lng: center.longitude + dlng,
        }
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> GpsPoint {
        GpsPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}
