//! Points of interest.

use geo::{Intersects, LineString, Polygon};
use serde::{Deserialize, Serialize};

use crate::GpsPoint;
use crate::geo_utils::{coordinates_equal, haversine_distance};
use crate::projection::distance_to_segment;

/// Geometry of a POI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PoiGeometry {
    Point { coordinate: GpsPoint },
    /// First ring is the outer boundary, any further rings are holes.
    Polygon { rings: Vec<Vec<GpsPoint>> },
}

/// A point of interest, such as a building, park or bus stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poi {
    pub key: String,
    pub geometry: PoiGeometry,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub localized_name: String,
    /// Keys of entrance POIs belonging to this place
    #[serde(default)]
    pub entrances: Vec<String>,
}

impl Poi {
    pub fn point(key: impl Into<String>, name: impl Into<String>, coordinate: GpsPoint) -> Self {
        Self {
            key: key.into(),
            geometry: PoiGeometry::Point { coordinate },
            category: String::new(),
            localized_name: name.into(),
            entrances: Vec::new(),
        }
    }

    pub fn polygon(key: impl Into<String>, name: impl Into<String>, outer: Vec<GpsPoint>) -> Self {
        Self {
            key: key.into(),
            geometry: PoiGeometry::Polygon { rings: vec![outer] },
            category: String::new(),
            localized_name: name.into(),
            entrances: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_entrances(mut self, entrances: Vec<String>) -> Self {
        self.entrances = entrances;
        self
    }

    /// All coordinates of the geometry (every ring for polygons).
    pub fn coordinates(&self) -> Vec<GpsPoint> {
        match &self.geometry {
            PoiGeometry::Point { coordinate } => vec![*coordinate],
            PoiGeometry::Polygon { rings } => rings.iter().flatten().copied().collect(),
        }
    }

    /// Whether `location` lies inside the POI. The boundary counts as inside; a
    /// point POI only contains its own coordinate.
    pub fn contains(&self, location: &GpsPoint) -> bool {
        match &self.geometry {
            PoiGeometry::Point { coordinate } => coordinates_equal(coordinate, location),
            PoiGeometry::Polygon { rings } => match to_polygon(rings) {
                Some(polygon) => polygon.intersects(&location.to_geo()),
                None => false,
            },
        }
    }

    /// Distance in meters from `location` to the closest point of the POI; zero
    /// when the location is inside.
    pub fn distance_to(&self, location: &GpsPoint) -> f64 {
        match &self.geometry {
            PoiGeometry::Point { coordinate } => haversine_distance(coordinate, location),
            PoiGeometry::Polygon { rings } => {
                if self.contains(location) {
                    return 0.0;
                }
                rings
                    .iter()
                    .flat_map(|ring| ring_edges(ring))
                    .map(|(a, b)| distance_to_segment(location, a, b).0)
                    .fold(f64::INFINITY, f64::min)
            }
        }
    }
}

/// Edges of a ring, closing it if the data left it open.
fn ring_edges(ring: &[GpsPoint]) -> Vec<(&GpsPoint, &GpsPoint)> {
    let mut edges: Vec<(&GpsPoint, &GpsPoint)> = ring.windows(2).map(|w| (&w[0], &w[1])).collect();
    if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
        if ring.len() > 1 && !coordinates_equal(first, last) {
            edges.push((last, first));
        }
    }
    if ring.len() == 1 {
        edges.push((&ring[0], &ring[0]));
    }
    edges
}

fn to_polygon(rings: &[Vec<GpsPoint>]) -> Option<Polygon<f64>> {
    let outer = rings.first().filter(|r| r.len() >= 3)?;
    let to_line = |ring: &Vec<GpsPoint>| -> LineString<f64> {
        ring.iter().map(|p| (p.longitude, p.latitude)).collect()
    };
    let holes = rings[1..].iter().filter(|r| r.len() >= 3).map(to_line).collect();
    Some(Polygon::new(to_line(outer), holes))
}
