//! Heading-relative road directions at an intersection.
//!
//! A road touches an intersection in one of three ways:
//!
//! ```text
//! 1. at its start       2. at its end        3. along the road
//! ---------             ---------            ---------
//! * →                         ← *              ← * →
//! ---------             ---------            ---------
//! ```
//!
//! The first two give one direction; the third splits the road at the vertex and
//! gives one per side.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::geo_utils::{MAX_ROAD_DISTANCE_FOR_BEARING, path_bearing, relative_bearing};
use crate::{Heading, Intersection, Road, RoadLookup};

/// How relative angles are bucketed into directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelativeDirectionType {
    /// Eight buckets: 60° wide diagonals, 30° wide cardinals.
    Combined,
    /// Four equal 90° buckets.
    Individual,
    /// Wide ahead and behind (150°), narrow left and right (30°).
    AheadBehind,
    /// Narrow ahead and behind (60°), wide left and right (120°). Used for roads
    /// at intersections.
    #[default]
    LeftRight,
}

/// A direction relative to the user. Variant order is the announcement order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Behind,
    BehindLeft,
    Left,
    AheadLeft,
    Ahead,
    AheadRight,
    Right,
    BehindRight,
    Unknown,
}

impl Direction {
    /// Bucket a clockwise angle (degrees in [0, 360)) measured from the heading.
    /// Negative or non-finite angles are [`Direction::Unknown`].
    pub fn from_relative(angle: f64, style: RelativeDirectionType) -> Self {
        if !angle.is_finite() || angle < 0.0 {
            return Direction::Unknown;
        }
        let a = angle % 360.0;

        match style {
            RelativeDirectionType::Combined => match a {
                a if a > 345.0 || a <= 15.0 => Direction::Ahead,
                a if a <= 75.0 => Direction::AheadRight,
                a if a <= 105.0 => Direction::Right,
                a if a <= 165.0 => Direction::BehindRight,
                a if a <= 195.0 => Direction::Behind,
                a if a <= 255.0 => Direction::BehindLeft,
                a if a <= 285.0 => Direction::Left,
                _ => Direction::AheadLeft,
            },
            RelativeDirectionType::Individual => match a {
                a if a > 315.0 || a <= 45.0 => Direction::Ahead,
                a if a <= 135.0 => Direction::Right,
                a if a <= 225.0 => Direction::Behind,
                _ => Direction::Left,
            },
            RelativeDirectionType::AheadBehind => match a {
                a if a > 285.0 || a <= 75.0 => Direction::Ahead,
                a if a <= 105.0 => Direction::Right,
                a if a <= 255.0 => Direction::Behind,
                _ => Direction::Left,
            },
            RelativeDirectionType::LeftRight => match a {
                a if a > 330.0 || a <= 30.0 => Direction::Ahead,
                a if a <= 150.0 => Direction::Right,
                a if a <= 210.0 => Direction::Behind,
                _ => Direction::Left,
            },
        }
    }

    /// Direction of `bearing` as seen facing `heading`.
    pub fn between(heading: Heading, bearing: Option<f64>, style: RelativeDirectionType) -> Self {
        match (heading.value(), bearing) {
            (Some(h), Some(b)) => Direction::from_relative(relative_bearing(h, b), style),
            _ => Direction::Unknown,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Direction::Behind => "behind",
            Direction::BehindLeft => "behind to the left",
            Direction::Left => "to the left",
            Direction::AheadLeft => "ahead to the left",
            Direction::Ahead => "ahead",
            Direction::AheadRight => "ahead to the right",
            Direction::Right => "to the right",
            Direction::BehindRight => "behind to the right",
            Direction::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// One way a road leaves an intersection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadDirection {
    pub road_key: String,
    pub road_name: String,
    /// Compass bearing of the road leaving the intersection
    pub bearing: f64,
    pub direction: Direction,
}

impl RoadDirection {
    fn new(road: &Road, bearing: f64, heading: Heading) -> Self {
        Self {
            road_key: road.key.clone(),
            road_name: road.localized_name.clone(),
            bearing,
            direction: Direction::between(heading, Some(bearing), RelativeDirectionType::LeftRight),
        }
    }
}

impl Intersection {
    /// Directions of all connected roads relative to `heading`, sorted by
    /// [`Direction`] order and then by road order. A road name appears at most
    /// once per direction.
    pub fn directions<L: RoadLookup + ?Sized>(&self, lookup: &L, heading: Heading) -> Vec<RoadDirection> {
        let mut directions: Vec<RoadDirection> = Vec::new();

        for road in self.roads(lookup) {
            let road_directions = self.road_directions(road, heading);
            if road_directions.is_empty() {
                debug!("[Intersection] No direction computed for road {}", road.key);
                continue;
            }

            for direction in road_directions {
                let duplicate = directions
                    .iter()
                    .any(|d| d.direction == direction.direction && d.road_name == direction.road_name);
                if duplicate {
                    debug!(
                        "[Intersection] Skipping duplicate direction ({}, {})",
                        direction.road_name, direction.direction
                    );
                    continue;
                }
                directions.push(direction);
            }
        }

        // Stable: equal directions keep road order
        directions.sort_by_key(|d| d.direction);
        directions
    }

    /// Directions in which `road` leaves this intersection: one when the road
    /// starts or ends here, up to two when it passes through, none when it does not
    /// touch the intersection.
    pub fn road_directions(&self, road: &Road, heading: Heading) -> Vec<RoadDirection> {
        if !road.has_segments() {
            debug!("[Intersection] Road {} has too few coordinates", road.key);
            return Vec::new();
        }

        if road.touches_at_start(&self.coordinate) {
            return road
                .bearing(false)
                .map(|b| vec![RoadDirection::new(road, b, heading)])
                .unwrap_or_default();
        }

        if road.touches_at_finish(&self.coordinate) {
            return road
                .bearing(true)
                .map(|b| vec![RoadDirection::new(road, b, heading)])
                .unwrap_or_default();
        }

        let Some(index) = road.vertex_index(&self.coordinate) else {
            debug!("[Intersection] Road {} does not pass through {}", road.key, self.key);
            return Vec::new();
        };

        let leading = &road.coordinates[index..];
        let trailing: Vec<_> = road.coordinates[..=index].iter().rev().copied().collect();

        [leading, trailing.as_slice()]
            .into_iter()
            .filter_map(|path| path_bearing(path, MAX_ROAD_DISTANCE_FOR_BEARING))
            .map(|b| RoadDirection::new(road, b, heading))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_right_bucket_edges() {
        let style = RelativeDirectionType::LeftRight;
        assert_eq!(Direction::from_relative(30.0, style), Direction::Ahead);
        assert_eq!(Direction::from_relative(30.1, style), Direction::Right);
        assert_eq!(Direction::from_relative(150.0, style), Direction::Right);
        assert_eq!(Direction::from_relative(210.0, style), Direction::Behind);
        assert_eq!(Direction::from_relative(330.0, style), Direction::Left);
        assert_eq!(Direction::from_relative(330.1, style), Direction::Ahead);
    }

    #[test]
    fn test_negative_angle_is_unknown() {
        assert_eq!(
            Direction::from_relative(-1.0, RelativeDirectionType::Individual),
            Direction::Unknown
        );
    }

    #[test]
    fn test_combined_diagonals() {
        let style = RelativeDirectionType::Combined;
        assert_eq!(Direction::from_relative(45.0, style), Direction::AheadRight);
        assert_eq!(Direction::from_relative(225.0, style), Direction::BehindLeft);
        assert_eq!(Direction::from_relative(315.0, style), Direction::AheadLeft);
    }

    #[test]
    fn test_direction_order() {
        assert!(Direction::Behind < Direction::Left);
        assert!(Direction::Left < Direction::Ahead);
        assert!(Direction::Ahead < Direction::Right);
        assert!(Direction::Right < Direction::Unknown);
    }
}
