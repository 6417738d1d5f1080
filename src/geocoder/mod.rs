//! # Reverse Geocoder
//!
//! Turns a location and heading into an [`ReverseGeocodeResult`], on every
//! location update.
//!
//! ## Algorithm
//!
//! 1. **Inside**: the nearest POIs (capped) are checked for containment. The first
//!    one containing the location wins and the sticky road is cleared.
//! 2. **Road search**: nearest road overall, plus the nearest point on the sticky
//!    road. No road at all clears the sticky road and yields a generic result.
//! 3. **Alongside**: when the nearest road is within the along-road threshold.
//!    Near an intersection the sticky road is kept if it is also within the
//!    threshold, so jitter between two nearly equidistant roads does not flap.
//!    The result carries the nearest main intersection ahead on the selected road.
//! 4. **Generic**: otherwise, referencing the nearest road and POI.

pub mod address;
pub mod live;
pub mod result;

use chrono::Utc;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::intersection::{IntersectionFilter, deduplicate_records, filter_intersections, find_closest, resolve_duplicate_records};
use crate::nearest_road::{RoadMatch, find_nearest_roads};
use crate::{
    GpsPoint, Heading, Intersection, Poi, RoadImportancePolicy, SecondaryRoadPolicy, SecondaryRoadsContext,
    SpatialSnapshot,
};

use result::{AlongsideResult, GenericResult, InsideResult, ReverseGeocodeResult};

/// Tuning of the reverse geocoder.
///
/// All distances in meters, angles in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeocoderConfig {
    /// A road closer than this means the user is alongside it
    pub along_road_threshold: f64,
    /// Within this distance of an intersection the sticky road is preferred
    pub near_intersection_distance: f64,
    /// Intersections further than this are never announced
    pub intersection_distance_threshold: f64,
    /// Width of the cone around the heading in which intersections count as ahead
    pub travel_direction_field_of_view: f64,
    /// How many of the nearest POIs are checked for containment
    pub max_poi_candidates: usize,
    /// Which roads count as main when classifying intersections
    pub secondary_roads_context: SecondaryRoadsContext,
    /// Radius of the snapshot requested from a provider
    pub search_radius: f64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            along_road_threshold: 20.0,
            near_intersection_distance: 30.0,
            intersection_distance_threshold: 500.0,
            travel_direction_field_of_view: 90.0,
            max_poi_candidates: 20,
            secondary_roads_context: SecondaryRoadsContext::Standard,
            search_radius: 200.0,
        }
    }
}

/// The road the user was last snapped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickyRoad {
    pub key: String,
    /// Localized name; the search matches roads by this, not by key
    pub name: String,
}

/// Stateful reverse geocoder.
///
/// Owns the sticky road, so one instance serves one stream of location updates.
#[derive(Debug, Clone)]
pub struct ReverseGeocoder<P = SecondaryRoadPolicy> {
    config: GeocoderConfig,
    policy: P,
    sticky: Option<StickyRoad>,
    destination: Option<String>,
}

impl Default for ReverseGeocoder<SecondaryRoadPolicy> {
    fn default() -> Self {
        Self::new(GeocoderConfig::default())
    }
}

impl ReverseGeocoder<SecondaryRoadPolicy> {
    /// Geocoder with the default road importance policy.
    pub fn new(config: GeocoderConfig) -> Self {
        Self::with_policy(config, SecondaryRoadPolicy::default())
    }
}

impl<P: RoadImportancePolicy> ReverseGeocoder<P> {
    pub fn with_policy(config: GeocoderConfig, policy: P) -> Self {
        Self {
            config,
            policy,
            sticky: None,
            destination: None,
        }
    }

    pub fn config(&self) -> &GeocoderConfig {
        &self.config
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// The road the user was last snapped to.
    pub fn sticky_road(&self) -> Option<&StickyRoad> {
        self.sticky.as_ref()
    }

    /// Forget the sticky road, returning it.
    pub fn clear_sticky_road(&mut self) -> Option<StickyRoad> {
        self.sticky.take()
    }

    /// Set the key of the POI the user is navigating to, returning the previous one.
    pub fn set_destination(&mut self, key: Option<String>) -> Option<String> {
        std::mem::replace(&mut self.destination, key)
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    fn is_destination(&self, key: &str) -> bool {
        self.destination.as_deref() == Some(key)
    }

    /// Describe `location`. Updates the sticky road as a side effect.
    pub fn reverse_geocode(
        &mut self,
        location: GpsPoint,
        snapshot: &SpatialSnapshot,
        heading: Heading,
    ) -> ReverseGeocodeResult {
        if !location.is_valid() {
            warn!("[ReverseGeocoder] Ignoring invalid location {}", location);
            let result = ReverseGeocodeResult::Generic(GenericResult {
                location,
                heading,
                timestamp: Utc::now(),
                road_key: None,
                road_snap_point: None,
                closest_road_key: None,
                closest_snap_point: None,
                poi_key: None,
                was_destination: false,
            });
            self.log_state(&result);
            return result;
        }

        let candidates = nearest_pois(&location, &snapshot.pois, self.config.max_poi_candidates);

        if let Some(poi) = candidates.iter().find(|p| p.contains(&location)) {
            self.sticky = None;
            let result = ReverseGeocodeResult::Inside(InsideResult {
                location,
                heading,
                timestamp: Utc::now(),
                poi_key: poi.key.clone(),
                was_destination: self.is_destination(&poi.key),
            });
            self.log_state(&result);
            return result;
        }

        let nearest_poi = candidates.first().map(|p| p.key.clone());
        let was_destination = nearest_poi.as_deref().is_some_and(|k| self.is_destination(k));

        let sticky_name = self.sticky.as_ref().map(|s| s.name.as_str());
        let search = find_nearest_roads(&location, &snapshot.roads, sticky_name);

        let Some(closest) = search.closest else {
            self.sticky = None;
            let result = ReverseGeocodeResult::Generic(GenericResult {
                location,
                heading,
                timestamp: Utc::now(),
                road_key: None,
                road_snap_point: None,
                closest_road_key: None,
                closest_snap_point: None,
                poi_key: nearest_poi,
                was_destination,
            });
            self.log_state(&result);
            return result;
        };

        if closest.distance.is_nan() || closest.distance >= self.config.along_road_threshold {
            let result = ReverseGeocodeResult::Generic(GenericResult {
                location,
                heading,
                timestamp: Utc::now(),
                road_key: Some(closest.road.key.clone()),
                road_snap_point: Some(closest.point),
                closest_road_key: Some(closest.road.key.clone()),
                closest_snap_point: Some(closest.point),
                poi_key: nearest_poi,
                was_destination,
            });
            self.log_state(&result);
            return result;
        }

        let selected = match search.sticky {
            Some(sticky) if self.should_stick(&sticky, &location, snapshot) => sticky,
            _ => closest,
        };

        let intersection = self.intersection_ahead(&location, heading, &selected, snapshot);

        self.sticky = Some(StickyRoad {
            key: selected.road.key.clone(),
            name: selected.road.localized_name.clone(),
        });

        let result = ReverseGeocodeResult::Alongside(AlongsideResult {
            location,
            heading,
            timestamp: Utc::now(),
            road_key: selected.road.key.clone(),
            road_name: selected.road.localized_name.clone(),
            road_snap_point: selected.point,
            closest_road_key: closest.road.key.clone(),
            closest_snap_point: closest.point,
            intersection_key: intersection.map(|i| i.key.clone()),
        });
        self.log_state(&result);
        result
    }

    /// Keep the sticky road only close to an intersection, and only while the user
    /// is still alongside it.
    fn should_stick(&self, sticky: &RoadMatch<'_>, location: &GpsPoint, snapshot: &SpatialSnapshot) -> bool {
        let Some(nearest) = find_closest(&snapshot.intersections, location) else {
            return false;
        };
        nearest.distance_to(location) < self.config.near_intersection_distance
            && sticky.distance < self.config.along_road_threshold
    }

    /// Nearest main intersection on the selected road within the field of view.
    fn intersection_ahead<'s>(
        &self,
        location: &GpsPoint,
        heading: Heading,
        selected: &RoadMatch<'_>,
        snapshot: &'s SpatialSnapshot,
    ) -> Option<&'s Intersection> {
        let records = deduplicate_records(&snapshot.intersections);
        let filter = IntersectionFilter {
            heading,
            field_of_view: self.config.travel_direction_field_of_view,
            max_distance: Some(self.config.intersection_distance_threshold),
            road_name: Some(selected.road.localized_name.as_str()),
            context: self.config.secondary_roads_context,
        };

        let intersection = filter_intersections(&records, snapshot, location, &filter, &self.policy)
            .into_iter()
            .next();

        if intersection.is_none() {
            debug!(
                "[ReverseGeocoder] Alongside {} but no intersection passed the filter",
                selected.road.localized_name
            );
        }
        intersection
    }

    fn log_state(&self, result: &ReverseGeocodeResult) {
        match result {
            ReverseGeocodeResult::Inside(r) => {
                debug!("[ReverseGeocoder] state (inside) at {}: poi {}", r.location, r.poi_key);
            }
            ReverseGeocodeResult::Alongside(r) => {
                debug!(
                    "[ReverseGeocoder] state (alongside) at {}: road {} ({}), intersection {}",
                    r.location,
                    r.road_name,
                    r.road_key,
                    r.intersection_key.as_deref().unwrap_or("none")
                );
            }
            ReverseGeocodeResult::Generic(r) => {
                debug!(
                    "[ReverseGeocoder] state (generic) at {}: road {}, poi {}",
                    r.location,
                    r.road_key.as_deref().unwrap_or("none"),
                    r.poi_key.as_deref().unwrap_or("none")
                );
            }
        }
    }
}

/// The `limit` POIs nearest to `location`, nearest first (ties by key).
fn nearest_pois<'a>(location: &GpsPoint, pois: &'a [Poi], limit: usize) -> Vec<&'a Poi> {
    let mut by_distance: Vec<(&Poi, f64)> = pois.iter().map(|p| (p, p.distance_to(location))).collect();
    by_distance.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.key.cmp(&b.0.key)));
    by_distance.truncate(limit);
    by_distance.into_iter().map(|(p, _)| p).collect()
}

/// The intersection nearest to `location`, for snapping waypoints.
///
/// Snaps to the nearest named road (any road when none is named), then returns the
/// intersection cataloged at the nearest data vertex for that road. When there is
/// none, a placeholder intersection referencing only that road is synthesized at
/// the vertex. `None` when the snapshot has no roads.
pub fn closest_intersection(location: &GpsPoint, snapshot: &SpatialSnapshot) -> Option<Intersection> {
    let has_named = snapshot.roads.iter().any(|r| !r.name.is_empty());
    let search = find_nearest_roads(
        location,
        snapshot.roads.iter().filter(|r| !has_named || !r.name.is_empty()),
        None,
    );

    let closest = search.closest?;
    let vertex = closest.nearest_vertex?;

    if let Some(found) = snapshot.intersection_for_road_at(&closest.road.key, &vertex) {
        return Some(resolve_duplicate_records(found, &snapshot.intersections).clone());
    }

    debug!(
        "[ReverseGeocoder] No intersection for road {} at {}, synthesizing one",
        closest.road.key, vertex
    );
    Some(Intersection::new(
        format!("{}@{:.7},{:.7}", closest.road.key, vertex.latitude, vertex.longitude),
        vertex,
        vec![closest.road.key.clone()],
    ))
}

/// [`closest_intersection`] for many locations.
pub fn closest_intersections(locations: &[GpsPoint], snapshot: &SpatialSnapshot) -> Vec<Option<Intersection>> {
    locations
        .iter()
        .map(|location| closest_intersection(location, snapshot))
        .collect()
}

/// [`closest_intersections`] using rayon. Worth it for long routes.
#[cfg(feature = "parallel")]
pub fn closest_intersections_parallel(
    locations: &[GpsPoint],
    snapshot: &SpatialSnapshot,
) -> Vec<Option<Intersection>> {
    use rayon::prelude::*;

    locations
        .par_iter()
        .map(|location| closest_intersection(location, snapshot))
        .collect()
}
