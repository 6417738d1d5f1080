//! Road segments.

use serde::{Deserialize, Serialize};

use crate::GpsPoint;
use crate::geo_utils::{MAX_ROAD_DISTANCE_FOR_BEARING, coordinates_equal, path_bearing, path_is_circular};

/// A road segment from the map data.
///
/// A single street is frequently split into many segments, each with its own key,
/// so names are not unique. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RoadRecord", rename_all = "camelCase")]
pub struct Road {
    /// Unique key of this segment
    pub key: String,
    /// Display name from the map data (may be empty)
    pub name: String,
    /// Name used for announcements and comparisons. Unnamed roads get a label
    /// derived from their type, e.g. "Service Road".
    pub localized_name: String,
    /// Road class tag, e.g. "primary", "residential_street", "walking_path"
    #[serde(rename = "type")]
    pub road_type: String,
    /// Whether this segment is part of a roundabout
    pub roundabout: bool,
    /// Ordered path. Segments need at least 2 points.
    pub coordinates: Vec<GpsPoint>,
}

/// Serialized form of a road; the localized name is optional.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoadRecord {
    key: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    localized_name: Option<String>,
    #[serde(rename = "type", default = "default_road_type")]
    road_type: String,
    #[serde(default)]
    roundabout: bool,
    #[serde(default)]
    coordinates: Vec<GpsPoint>,
}

fn default_road_type() -> String {
    "road".to_string()
}

impl From<RoadRecord> for Road {
    fn from(record: RoadRecord) -> Self {
        let mut road = Road::new(record.key, record.name, record.road_type, record.coordinates)
            .with_roundabout(record.roundabout);
        if let Some(localized) = record.localized_name.filter(|n| !n.is_empty()) {
            road.localized_name = localized;
        }
        road
    }
}

impl Road {
    /// Create a road. The localized name defaults to `name`, or to a label derived
    /// from `road_type` when the road is unnamed.
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        road_type: impl Into<String>,
        coordinates: Vec<GpsPoint>,
    ) -> Self {
        let name = name.into();
        let road_type = road_type.into();
        let localized_name = if name.is_empty() {
            type_label(&road_type)
        } else {
            name.clone()
        };

        Self {
            key: key.into(),
            name,
            localized_name,
            road_type,
            roundabout: false,
            coordinates,
        }
    }

    pub fn with_localized_name(mut self, localized_name: impl Into<String>) -> Self {
        self.localized_name = localized_name.into();
        self
    }

    pub fn with_roundabout(mut self, roundabout: bool) -> Self {
        self.roundabout = roundabout;
        self
    }

    /// Whether the road has at least one segment.
    pub fn has_segments(&self) -> bool {
        self.coordinates.len() >= 2
    }

    /// Whether this road is a "close": a circular path whose ends coincide.
    pub fn is_circular(&self) -> bool {
        path_is_circular(&self.coordinates)
    }

    /// Whether `coordinate` is this road's first or last vertex.
    pub fn touches_at_end(&self, coordinate: &GpsPoint) -> bool {
        self.touches_at_start(coordinate) || self.touches_at_finish(coordinate)
    }

    pub fn touches_at_start(&self, coordinate: &GpsPoint) -> bool {
        self.coordinates
            .first()
            .is_some_and(|c| coordinates_equal(c, coordinate))
    }

    pub fn touches_at_finish(&self, coordinate: &GpsPoint) -> bool {
        self.coordinates
            .last()
            .is_some_and(|c| coordinates_equal(c, coordinate))
    }

    /// Index of the first vertex equal to `coordinate`.
    pub fn vertex_index(&self, coordinate: &GpsPoint) -> Option<usize> {
        self.coordinates
            .iter()
            .position(|c| coordinates_equal(c, coordinate))
    }

    /// Bearing of the road measured from its first coordinate (or its last, when
    /// `reversed`), looking at most 25 m along it.
    pub fn bearing(&self, reversed: bool) -> Option<f64> {
        if self.coordinates.is_empty() {
            return None;
        }
        if reversed {
            let path: Vec<GpsPoint> = self.coordinates.iter().rev().copied().collect();
            path_bearing(&path, MAX_ROAD_DISTANCE_FOR_BEARING)
        } else {
            path_bearing(&self.coordinates, MAX_ROAD_DISTANCE_FOR_BEARING)
        }
    }
}

/// Human readable label for a road type tag: "walking_path" -> "Walking Path".
pub fn type_label(road_type: &str) -> String {
    road_type
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_label() {
        assert_eq!(type_label("walking_path"), "Walking Path");
        assert_eq!(type_label("road"), "Road");
        assert_eq!(type_label(""), "");
    }

    #[test]
    fn test_unnamed_road_gets_type_label() {
        let road = Road::new("r1", "", "service_road", vec![]);
        assert_eq!(road.localized_name, "Service Road");
    }

    #[test]
    fn test_deserialize_without_localized_name() {
        let json = r#"{"key":"r1","name":"Pike Street","type":"primary",
            "coordinates":[{"latitude":47.6,"longitude":-122.3},{"latitude":47.6,"longitude":-122.2}]}"#;
        let road: Road = serde_json::from_str(json).unwrap();
        assert_eq!(road.localized_name, "Pike Street");
        assert!(!road.roundabout);
        assert!(road.has_segments());
    }
}
