//! Reverse geocoding results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{GpsPoint, Heading};

/// The user is inside a place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsideResult {
    pub location: GpsPoint,
    pub heading: Heading,
    pub timestamp: DateTime<Utc>,
    pub poi_key: String,
    /// Whether the POI was the active destination
    pub was_destination: bool,
}

/// The user is walking along a road.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlongsideResult {
    pub location: GpsPoint,
    pub heading: Heading,
    pub timestamp: DateTime<Utc>,
    /// Selected road (the sticky road when hysteresis applied)
    pub road_key: String,
    /// Localized name of the selected road
    pub road_name: String,
    pub road_snap_point: GpsPoint,
    /// Globally nearest road, which may differ from the selected one
    pub closest_road_key: String,
    pub closest_snap_point: GpsPoint,
    /// Next main intersection ahead on the selected road
    pub intersection_key: Option<String>,
}

/// Near a road and/or place but not on or in either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericResult {
    pub location: GpsPoint,
    pub heading: Heading,
    pub timestamp: DateTime<Utc>,
    pub road_key: Option<String>,
    pub road_snap_point: Option<GpsPoint>,
    pub closest_road_key: Option<String>,
    pub closest_snap_point: Option<GpsPoint>,
    /// Nearest POI
    pub poi_key: Option<String>,
    /// Whether the nearest POI was the active destination
    pub was_destination: bool,
}

/// What the user's location means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ReverseGeocodeResult {
    Inside(InsideResult),
    Alongside(AlongsideResult),
    Generic(GenericResult),
}

impl ReverseGeocodeResult {
    pub fn location(&self) -> GpsPoint {
        match self {
            Self::Inside(r) => r.location,
            Self::Alongside(r) => r.location,
            Self::Generic(r) => r.location,
        }
    }

    pub fn heading(&self) -> Heading {
        match self {
            Self::Inside(r) => r.heading,
            Self::Alongside(r) => r.heading,
            Self::Generic(r) => r.heading,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Inside(r) => r.timestamp,
            Self::Alongside(r) => r.timestamp,
            Self::Generic(r) => r.timestamp,
        }
    }

    /// Key of the road the result refers to, if any.
    pub fn road_key(&self) -> Option<&str> {
        match self {
            Self::Inside(_) => None,
            Self::Alongside(r) => Some(&r.road_key),
            Self::Generic(r) => r.road_key.as_deref(),
        }
    }

    /// Key of the POI the result refers to, if any.
    pub fn poi_key(&self) -> Option<&str> {
        match self {
            Self::Inside(r) => Some(&r.poi_key),
            Self::Alongside(_) => None,
            Self::Generic(r) => r.poi_key.as_deref(),
        }
    }

    pub fn is_inside(&self) -> bool {
        matches!(self, Self::Inside(_))
    }

    pub fn is_alongside(&self) -> bool {
        matches!(self, Self::Alongside(_))
    }

    pub fn is_generic(&self) -> bool {
        matches!(self, Self::Generic(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Inside(_) => "inside",
            Self::Alongside(_) => "alongside",
            Self::Generic(_) => "generic",
        }
    }

    /// Whether moving from `self` to `other` is worth a new announcement.
    ///
    /// Alongside results compare road names, not keys: one street is usually many
    /// segments. Generic results always differ; callers decide how to compare them.
    pub fn is_significantly_different(&self, other: &ReverseGeocodeResult) -> bool {
        match (self, other) {
            (Self::Inside(a), Self::Inside(b)) => a.poi_key != b.poi_key,
            (Self::Alongside(a), Self::Alongside(b)) => a.road_name != b.road_name,
            _ => true,
        }
    }
}
