//! Per-call spatial snapshots.
//!
//! A snapshot is the bounded set of roads, POIs and intersections around a
//! location at one instant. The geocoder reads it and never mutates it; a fresh
//! one is requested for every location update.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{GpsPoint, Intersection, Poi, Road};

/// Read-only road lookup by key.
///
/// Intersections only store road keys, so anything that resolves them takes a
/// `RoadLookup` instead of reaching into a global cache.
pub trait RoadLookup {
    fn road(&self, key: &str) -> Option<&Road>;
}

impl RoadLookup for HashMap<String, Road> {
    fn road(&self, key: &str) -> Option<&Road> {
        self.get(key)
    }
}

/// Source of spatial snapshots, usually backed by a tile cache.
pub trait SnapshotProvider {
    /// Snapshot of the features within `radius` meters of `location`, or `None`
    /// when no data is available there.
    fn snapshot(&self, location: GpsPoint, radius: f64) -> Option<SpatialSnapshot>;
}

impl<T: SnapshotProvider + ?Sized> SnapshotProvider for &T {
    fn snapshot(&self, location: GpsPoint, radius: f64) -> Option<SpatialSnapshot> {
        (**self).snapshot(location, radius)
    }
}

impl<T: SnapshotProvider + ?Sized> SnapshotProvider for std::sync::Arc<T> {
    fn snapshot(&self, location: GpsPoint, radius: f64) -> Option<SpatialSnapshot> {
        (**self).snapshot(location, radius)
    }
}

/// Roads, POIs and intersections near a location, with a road key index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "SnapshotRecord")]
pub struct SpatialSnapshot {
    pub roads: Vec<Road>,
    pub pois: Vec<Poi>,
    pub intersections: Vec<Intersection>,
    #[serde(skip)]
    road_index: HashMap<String, usize>,
}

#[derive(Deserialize)]
struct SnapshotRecord {
    #[serde(default)]
    roads: Vec<Road>,
    #[serde(default)]
    pois: Vec<Poi>,
    #[serde(default)]
    intersections: Vec<Intersection>,
}

impl From<SnapshotRecord> for SpatialSnapshot {
    fn from(record: SnapshotRecord) -> Self {
        SpatialSnapshot::new(record.roads, record.pois, record.intersections)
    }
}

impl SpatialSnapshot {
    pub fn new(roads: Vec<Road>, pois: Vec<Poi>, intersections: Vec<Intersection>) -> Self {
        let road_index = roads
            .iter()
            .enumerate()
            .map(|(i, r)| (r.key.clone(), i))
            .collect();
        Self {
            roads,
            pois,
            intersections,
            road_index,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.roads.is_empty() && self.pois.is_empty() && self.intersections.is_empty()
    }

    pub fn poi(&self, key: &str) -> Option<&Poi> {
        self.pois.iter().find(|p| p.key == key)
    }

    pub fn intersection(&self, key: &str) -> Option<&Intersection> {
        self.intersections.iter().find(|i| i.key == key)
    }

    /// The cataloged intersection at `coordinate` that references `road_key`.
    pub fn intersection_for_road_at(&self, road_key: &str, coordinate: &GpsPoint) -> Option<&Intersection> {
        self.intersections
            .iter()
            .find(|i| i.coordinate.same_location(coordinate) && i.road_keys.iter().any(|k| k == road_key))
    }
}

impl RoadLookup for SpatialSnapshot {
    fn road(&self, key: &str) -> Option<&Road> {
        self.road_index.get(key).map(|&i| &self.roads[i])
    }
}
