//! Synthetic street grid generator for stress testing and benchmarking.
//!
//! Generates Manhattan-style street grids with known intersections and
//! buildings, providing ground truth for the geocoder: every grid node is a
//! main intersection of a named street and a named avenue, and every building
//! sits in the middle of its block.
//!
//! Feature-gated behind `synthetic`, not included in production builds.
//!
//! # Example
//!
//! ```rust
//! use roadside::synthetic::SyntheticGrid;
//!
//! let grid = SyntheticGrid::downtown();
//! let map = grid.generate();
//! assert_eq!(map.intersections.len(), grid.rows * grid.columns);
//! ```

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::geo_utils::meters_to_degrees;
use crate::{GpsPoint, Intersection, MapRepository, Poi, Result, Road, SpatialSnapshot};

// ============================================================================
// Types
// ============================================================================

/// Configuration of a synthetic street grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyntheticGrid {
    /// South-west corner of the grid.
    pub origin: GpsPoint,
    /// Number of east-west streets.
    pub rows: usize,
    /// Number of north-south avenues.
    pub columns: usize,
    /// Distance between neighbouring streets in meters.
    pub block_meters: f64,
    /// Standard deviation of the noise applied to mid-block vertices, in meters.
    /// Grid nodes are never perturbed so intersections stay exact.
    pub jitter_meters: f64,
    /// Fraction of blocks that get a building (0.0-1.0).
    pub building_fraction: f64,
    /// Fraction of streets mapped as unnamed service roads (0.0-1.0).
    pub unnamed_fraction: f64,
    /// RNG seed for deterministic reproduction.
    pub seed: u64,
}

/// Metadata about a generated map.
#[derive(Debug, Clone)]
pub struct GridMetadata {
    pub road_segments: usize,
    pub buildings: usize,
    pub intersections: usize,
    /// Total vertices across all road segments.
    pub total_vertices: usize,
}

/// A generated street grid.
#[derive(Debug, Clone)]
pub struct SyntheticMap {
    pub roads: Vec<Road>,
    pub pois: Vec<Poi>,
    pub intersections: Vec<Intersection>,
    pub metadata: GridMetadata,
}

/// Seattle origin: mid latitude, where the meter/degree distortion is realistic.
const SEATTLE: GpsPoint = GpsPoint {
    latitude: 47.6062,
    longitude: -122.3321,
};

impl Default for SyntheticGrid {
    fn default() -> Self {
        Self::downtown()
    }
}

// ============================================================================
// Naming
// ============================================================================

/// "1st Street", "2nd Street", "11th Street", ...
fn street_name(row: usize) -> String {
    let n = row + 1;
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix} Street")
}

fn avenue_name(column: usize) -> String {
    format!("Avenue {}", column + 1)
}

fn row_segment_key(row: usize, column: usize) -> String {
    format!("street-{row}-{column}")
}

fn column_segment_key(row: usize, column: usize) -> String {
    format!("avenue-{row}-{column}")
}

// ============================================================================
// Generation
// ============================================================================

impl SyntheticGrid {
    /// Location of the grid node at (`row`, `column`).
    pub fn node(&self, row: usize, column: usize) -> GpsPoint {
        self.offset(row as f64 * self.block_meters, column as f64 * self.block_meters)
    }

    /// Point `north` and `east` meters from the origin.
    fn offset(&self, north: f64, east: f64) -> GpsPoint {
        let (dlat_per_m, dlng_per_m) = meters_to_degrees(1.0, self.origin.latitude);
        GpsPoint::new(
            self.origin.latitude + north * dlat_per_m,
            self.origin.longitude + east * dlng_per_m,
        )
    }

    /// Midpoint of `a` and `b` moved by Gaussian noise.
    fn jittered_midpoint(&self, a: &GpsPoint, b: &GpsPoint, rng: &mut StdRng) -> GpsPoint {
        let mid = GpsPoint::new((a.latitude + b.latitude) / 2.0, (a.longitude + b.longitude) / 2.0);
        if self.jitter_meters <= 0.0 {
            return mid;
        }

        // Box-Muller transform
        let u1: f64 = rng.gen_range(0.0001..1.0);
        let u2: f64 = rng.r#gen();
        let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        let z1 = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).sin();

        let (dlat, dlng) = meters_to_degrees(self.jitter_meters, mid.latitude);
        GpsPoint::new(mid.latitude + z0 * dlat, mid.longitude + z1 * dlng)
    }

    /// Generate the grid. Each street is split into one segment per block, and
    /// every node gets an intersection listing the segments that touch it.
    pub fn generate(&self) -> SyntheticMap {
        let mut rng = StdRng::seed_from_u64(self.seed);

        let row_named: Vec<bool> = (0..self.rows)
            .map(|_| rng.r#gen::<f64>() >= self.unnamed_fraction)
            .collect();
        let column_named: Vec<bool> = (0..self.columns)
            .map(|_| rng.r#gen::<f64>() >= self.unnamed_fraction)
            .collect();

        let mut roads = Vec::new();

        for row in 0..self.rows {
            let (name, road_type) = if row_named[row] {
                (street_name(row), "residential_street")
            } else {
                (String::new(), "service_road")
            };
            for column in 0..self.columns.saturating_sub(1) {
                let start = self.node(row, column);
                let end = self.node(row, column + 1);
                let mid = self.jittered_midpoint(&start, &end, &mut rng);
                roads.push(Road::new(
                    row_segment_key(row, column),
                    name.clone(),
                    road_type,
                    vec![start, mid, end],
                ));
            }
        }

        for column in 0..self.columns {
            let (name, road_type) = if column_named[column] {
                (avenue_name(column), "primary")
            } else {
                (String::new(), "service_road")
            };
            for row in 0..self.rows.saturating_sub(1) {
                let start = self.node(row, column);
                let end = self.node(row + 1, column);
                let mid = self.jittered_midpoint(&start, &end, &mut rng);
                roads.push(Road::new(
                    column_segment_key(row, column),
                    name.clone(),
                    road_type,
                    vec![start, mid, end],
                ));
            }
        }

        let mut intersections = Vec::with_capacity(self.rows * self.columns);
        for row in 0..self.rows {
            for column in 0..self.columns {
                let mut road_keys = Vec::with_capacity(4);
                if column > 0 {
                    road_keys.push(row_segment_key(row, column - 1));
                }
                if column + 1 < self.columns {
                    road_keys.push(row_segment_key(row, column));
                }
                if row > 0 {
                    road_keys.push(column_segment_key(row - 1, column));
                }
                if row + 1 < self.rows {
                    road_keys.push(column_segment_key(row, column));
                }
                intersections.push(Intersection::new(
                    format!("node-{row}-{column}"),
                    self.node(row, column),
                    road_keys,
                ));
            }
        }

        let mut pois = Vec::new();
        for row in 0..self.rows.saturating_sub(1) {
            for column in 0..self.columns.saturating_sub(1) {
                let has_building: f64 = rng.r#gen();
                if has_building >= self.building_fraction {
                    continue;
                }
                // Inset by a quarter block on every side
                let south = (row as f64 + 0.25) * self.block_meters;
                let north = (row as f64 + 0.75) * self.block_meters;
                let west = (column as f64 + 0.25) * self.block_meters;
                let east = (column as f64 + 0.75) * self.block_meters;
                pois.push(
                    Poi::polygon(
                        format!("building-{row}-{column}"),
                        format!("Building {}-{}", row + 1, column + 1),
                        vec![
                            self.offset(south, west),
                            self.offset(south, east),
                            self.offset(north, east),
                            self.offset(north, west),
                            self.offset(south, west),
                        ],
                    )
                    .with_category("building"),
                );
            }
        }

        let metadata = GridMetadata {
            road_segments: roads.len(),
            buildings: pois.len(),
            intersections: intersections.len(),
            total_vertices: roads.iter().map(|r| r.coordinates.len()).sum(),
        };

        SyntheticMap {
            roads,
            pois,
            intersections,
            metadata,
        }
    }

    /// Centre of the building block at (`row`, `column`).
    pub fn block_center(&self, row: usize, column: usize) -> GpsPoint {
        self.offset(
            (row as f64 + 0.5) * self.block_meters,
            (column as f64 + 0.5) * self.block_meters,
        )
    }

    /// A walk eastwards along street `row`, `offset_meters` north of its centre
    /// line, one fix every `spacing_meters`, with Gaussian GPS noise.
    pub fn trace_along_street(
        &self,
        row: usize,
        offset_meters: f64,
        spacing_meters: f64,
        noise_meters: f64,
    ) -> Vec<GpsPoint> {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(row as u64 + 1));
        let length = self.columns.saturating_sub(1) as f64 * self.block_meters;
        let steps = (length / spacing_meters.max(0.1)).floor() as usize;
        let north = row as f64 * self.block_meters + offset_meters;

        (0..=steps)
            .map(|i| {
                let east = i as f64 * spacing_meters;
                let (dn, de) = if noise_meters > 0.0 {
                    (
                        rng.gen_range(-noise_meters..noise_meters),
                        rng.gen_range(-noise_meters..noise_meters),
                    )
                } else {
                    (0.0, 0.0)
                };
                self.offset(north + dn, east + de)
            })
            .collect()
    }
}

impl SyntheticMap {
    pub fn to_snapshot(&self) -> SpatialSnapshot {
        SpatialSnapshot::new(self.roads.clone(), self.pois.clone(), self.intersections.clone())
    }

    pub fn into_repository(self) -> Result<MapRepository> {
        MapRepository::new(self.roads, self.pois, self.intersections)
    }
}

// ============================================================================
// Predefined Grids
// ============================================================================

impl SyntheticGrid {
    /// 10x10 grid of 100m blocks, half of them built up. Baseline benchmark.
    pub fn downtown() -> Self {
        Self {
            origin: SEATTLE,
            rows: 10,
            columns: 10,
            block_meters: 100.0,
            jitter_meters: 1.0,
            building_fraction: 0.5,
            unnamed_fraction: 0.0,
            seed: 42,
        }
    }

    /// 60x60 grid of 80m blocks with some unnamed service roads. Stresses the
    /// repository queries and the road search.
    pub fn city_scale() -> Self {
        Self {
            origin: SEATTLE,
            rows: 60,
            columns: 60,
            block_meters: 80.0,
            jitter_meters: 2.0,
            building_fraction: 0.7,
            unnamed_fraction: 0.15,
            seed: 43,
        }
    }

    /// Square grid of `size` streets each way, for scaling benchmarks.
    pub fn with_size(size: usize) -> Self {
        Self {
            rows: size,
            columns: size,
            seed: size as u64 * 7919,
            ..Self::downtown()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
