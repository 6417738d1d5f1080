//! In-memory map repository.
//!
//! Holds every road, POI and intersection of a loaded map in flat arenas with a
//! key index, plus an R-tree of feature envelopes for bounding box queries. Serves
//! [`SpatialSnapshot`]s to the geocoder through [`SnapshotProvider`].

use std::collections::HashMap;
use std::path::Path;

use log::{info, warn};
use rstar::{AABB, RTree, RTreeObject};
use serde::Deserialize;

use crate::{Bounds, GeocodeError, GpsPoint, Intersection, Poi, Result, Road, RoadLookup, SnapshotProvider, SpatialSnapshot};

/// Index of a feature in one of the arenas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Feature {
    Road(usize),
    Poi(usize),
    Intersection(usize),
}

/// Feature envelope wrapper for R-tree spatial indexing.
#[derive(Debug, Clone)]
struct FeatureBounds {
    feature: Feature,
    bounds: Bounds,
}

impl RTreeObject for FeatureBounds {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bounds.min_lng, self.bounds.min_lat],
            [self.bounds.max_lng, self.bounds.max_lat],
        )
    }
}

/// Serialized map: the same shape as a snapshot.
#[derive(Deserialize)]
struct MapFile {
    #[serde(default)]
    roads: Vec<Road>,
    #[serde(default)]
    pois: Vec<Poi>,
    #[serde(default)]
    intersections: Vec<Intersection>,
}

/// Read-only store of a whole map.
#[derive(Debug, Default)]
pub struct MapRepository {
    roads: Vec<Road>,
    pois: Vec<Poi>,
    intersections: Vec<Intersection>,
    road_index: HashMap<String, usize>,
    tree: RTree<FeatureBounds>,
    coverage: Option<Bounds>,
}

impl MapRepository {
    /// Build a repository. Road keys must be unique; intersections referencing
    /// unknown roads are kept but logged.
    pub fn new(roads: Vec<Road>, pois: Vec<Poi>, intersections: Vec<Intersection>) -> Result<Self> {
        let mut road_index = HashMap::with_capacity(roads.len());
        for (i, road) in roads.iter().enumerate() {
            if road_index.insert(road.key.clone(), i).is_some() {
                return Err(GeocodeError::MapData(format!("duplicate road key {}", road.key)));
            }
        }

        for intersection in &intersections {
            for key in &intersection.road_keys {
                if !road_index.contains_key(key) {
                    warn!(
                        "[MapRepository] Intersection {} references unknown road {}",
                        intersection.key, key
                    );
                }
            }
        }

        let mut entries: Vec<FeatureBounds> = Vec::new();
        let mut all_points: Vec<GpsPoint> = Vec::new();

        let features = roads
            .iter()
            .enumerate()
            .map(|(i, r)| (Feature::Road(i), r.coordinates.clone()))
            .chain(pois.iter().enumerate().map(|(i, p)| (Feature::Poi(i), p.coordinates())))
            .chain(
                intersections
                    .iter()
                    .enumerate()
                    .map(|(i, x)| (Feature::Intersection(i), vec![x.coordinate])),
            );

        for (feature, points) in features {
            // Features without geometry can still be looked up by key
            if let Some(bounds) = Bounds::from_points(&points) {
                entries.push(FeatureBounds { feature, bounds });
                all_points.extend(points);
            }
        }

        let repository = Self {
            tree: RTree::bulk_load(entries),
            coverage: Bounds::from_points(&all_points),
            roads,
            pois,
            intersections,
            road_index,
        };

        info!(
            "[MapRepository] Indexed {} roads, {} POIs, {} intersections",
            repository.roads.len(),
            repository.pois.len(),
            repository.intersections.len()
        );

        Ok(repository)
    }

    /// Parse a map from JSON (`{"roads": [...], "pois": [...], "intersections": [...]}`).
    pub fn from_json(json: &str) -> Result<Self> {
        let file: MapFile = serde_json::from_str(json)?;
        Self::new(file.roads, file.pois, file.intersections)
    }

    /// Load a JSON map from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("[MapRepository] Loading map from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    pub fn pois(&self) -> &[Poi] {
        &self.pois
    }

    pub fn intersections(&self) -> &[Intersection] {
        &self.intersections
    }

    pub fn poi(&self, key: &str) -> Option<&Poi> {
        self.pois.iter().find(|p| p.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.roads.is_empty() && self.pois.is_empty() && self.intersections.is_empty()
    }

    /// Bounding box of all features with geometry.
    pub fn coverage(&self) -> Option<Bounds> {
        self.coverage
    }

    /// Number of features in the spatial index.
    pub fn indexed_len(&self) -> usize {
        self.tree.size()
    }

    /// All features whose envelope intersects `bounds`, in arena order.
    pub fn query(&self, bounds: &Bounds) -> SpatialSnapshot {
        let search = AABB::from_corners([bounds.min_lng, bounds.min_lat], [bounds.max_lng, bounds.max_lat]);

        let mut road_ids = Vec::new();
        let mut poi_ids = Vec::new();
        let mut intersection_ids = Vec::new();
        for entry in self.tree.locate_in_envelope_intersecting(&search) {
            match entry.feature {
                Feature::Road(i) => road_ids.push(i),
                Feature::Poi(i) => poi_ids.push(i),
                Feature::Intersection(i) => intersection_ids.push(i),
            }
        }
        // Tree order is arbitrary; keep snapshots deterministic
        road_ids.sort_unstable();
        poi_ids.sort_unstable();
        intersection_ids.sort_unstable();

        SpatialSnapshot::new(
            road_ids.into_iter().map(|i| self.roads[i].clone()).collect(),
            poi_ids.into_iter().map(|i| self.pois[i].clone()).collect(),
            intersection_ids
                .into_iter()
                .map(|i| self.intersections[i].clone())
                .collect(),
        )
    }

    /// Features within roughly `radius` meters of `center`.
    pub fn query_around(&self, center: GpsPoint, radius: f64) -> SpatialSnapshot {
        self.query(&Bounds::around(center, radius))
    }

    /// Whether the search area around `location` overlaps the loaded data.
    pub fn covers(&self, location: GpsPoint, radius: f64) -> bool {
        let Some(coverage) = self.coverage else {
            return false;
        };
        let area = Bounds::around(location, radius);
        area.min_lat <= coverage.max_lat
            && area.max_lat >= coverage.min_lat
            && area.min_lng <= coverage.max_lng
            && area.max_lng >= coverage.min_lng
    }
}

impl RoadLookup for MapRepository {
    fn road(&self, key: &str) -> Option<&Road> {
        self.road_index.get(key).map(|&i| &self.roads[i])
    }
}

impl SnapshotProvider for MapRepository {
    /// `None` outside the loaded map. Inside it, an empty snapshot is a valid answer.
    fn snapshot(&self, location: GpsPoint, radius: f64) -> Option<SpatialSnapshot> {
        if !self.covers(location, radius) {
            return None;
        }
        Some(self.query_around(location, radius))
    }
}
