//! Road importance policy.
//!
//! Which roads are worth announcing depends on context: walking paths are noise
//! for most users, service roads are noise while driving, and unnamed residential
//! streets are noise under the strictest setting. The geocoder only needs a yes/no
//! answer per road, so the policy is a trait; [`SecondaryRoadPolicy`] is the
//! default used by the application.

use serde::{Deserialize, Serialize};

use crate::Road;
use crate::road::type_label;

/// How aggressively secondary roads are excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecondaryRoadsContext {
    /// Walking paths, bicycle paths, crossings, steps and merging lanes are secondary.
    #[default]
    Standard,
    /// Additionally unnamed roads and service roads.
    Automotive,
    /// Additionally residential and pedestrian streets.
    Strict,
}

const STANDARD_SECONDARY_TYPES: &[&str] = &[
    "walking_path",
    "bicycle_path",
    "crossing",
    "steps",
    "merging_lane",
];

const AUTOMOTIVE_SECONDARY_TYPES: &[&str] = &["road", "service_road"];

const STRICT_SECONDARY_TYPES: &[&str] = &["residential_street", "pedestrian_street"];

impl SecondaryRoadsContext {
    /// Road types considered secondary in this context.
    pub fn secondary_road_types(&self) -> Vec<&'static str> {
        let mut types = STANDARD_SECONDARY_TYPES.to_vec();
        if matches!(self, Self::Automotive | Self::Strict) {
            types.extend_from_slice(AUTOMOTIVE_SECONDARY_TYPES);
        }
        if matches!(self, Self::Strict) {
            types.extend_from_slice(STRICT_SECONDARY_TYPES);
        }
        types
    }

    /// Labels that unnamed roads of the secondary types carry as their localized name.
    pub fn secondary_road_labels(&self) -> Vec<String> {
        self.secondary_road_types()
            .into_iter()
            .map(type_label)
            .collect()
    }
}

impl std::fmt::Display for SecondaryRoadsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => f.write_str("standard"),
            Self::Automotive => f.write_str("automotive"),
            Self::Strict => f.write_str("strict"),
        }
    }
}

/// Decides whether a road is a "main" road, significant enough to announce.
pub trait RoadImportancePolicy {
    fn is_main(&self, road: &Road, context: SecondaryRoadsContext) -> bool;
}

impl<F> RoadImportancePolicy for F
where
    F: Fn(&Road, SecondaryRoadsContext) -> bool,
{
    fn is_main(&self, road: &Road, context: SecondaryRoadsContext) -> bool {
        self(road, context)
    }
}

/// How [`SecondaryRoadPolicy`] recognises main roads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MainRoadDetection {
    /// Named roads are main; unnamed roads are main unless their label names a
    /// secondary type.
    #[default]
    RoadName,
    /// Main unless the road type is secondary in the context.
    RoadType,
}

/// The default road importance policy.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondaryRoadPolicy {
    pub detection: MainRoadDetection,
}

impl SecondaryRoadPolicy {
    pub fn new(detection: MainRoadDetection) -> Self {
        Self { detection }
    }
}

impl RoadImportancePolicy for SecondaryRoadPolicy {
    fn is_main(&self, road: &Road, context: SecondaryRoadsContext) -> bool {
        match self.detection {
            MainRoadDetection::RoadName => {
                if !road.name.is_empty() {
                    return true;
                }
                let localized = road.localized_name.to_lowercase();
                !context
                    .secondary_road_labels()
                    .iter()
                    .any(|label| label.to_lowercase() == localized)
            }
            MainRoadDetection::RoadType => !context
                .secondary_road_types()
                .contains(&road.road_type.as_str()),
        }
    }
}
