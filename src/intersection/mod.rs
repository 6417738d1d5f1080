//! # Intersections
//!
//! An intersection is a map vertex shared by two or more road segments. Most of
//! them are not worth announcing: a footpath meeting a service road, or a street
//! that the data happens to split in two. [`Intersection::is_main`] decides which
//! ones are, using five independent heuristics (any one is enough):
//!
//! 1. At least two distinct names among the main roads
//! 2. Two distinct main segments meet and one of them is a close (a loop)
//! 3. The intersection is on a roundabout and some connected road is main
//! 4. One named street changes road type here
//! 5. A "T" formed by a street with itself: one segment ends here while a
//!    same-named segment passes through
//!
//! This module also holds the filtering and lookup helpers the geocoder uses to
//! pick the next intersection ahead of the user.

pub mod direction;

use std::collections::HashSet;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::geo_utils::{angle_difference, bearing, haversine_distance};
use crate::{GpsPoint, Heading, Road, RoadImportancePolicy, RoadLookup, SecondaryRoadsContext};

/// Name used when none of the connected roads has a name.
pub const UNNAMED_INTERSECTION: &str = "Intersection";

/// A map vertex where road segments meet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intersection {
    pub key: String,
    pub coordinate: GpsPoint,
    /// Keys of the connected roads, in data order. May contain duplicates.
    pub road_keys: Vec<String>,
}

impl Intersection {
    pub fn new(key: impl Into<String>, coordinate: GpsPoint, road_keys: Vec<String>) -> Self {
        Self {
            key: key.into(),
            coordinate,
            road_keys,
        }
    }

    /// The connected roads that `lookup` knows about, in `road_keys` order.
    pub fn roads<'a, L: RoadLookup + ?Sized>(&self, lookup: &'a L) -> Vec<&'a Road> {
        self.road_keys
            .iter()
            .filter_map(|key| lookup.road(key))
            .collect()
    }

    /// Number of distinct road keys.
    pub fn distinct_road_count(&self) -> usize {
        self.road_keys.iter().collect::<HashSet<_>>().len()
    }

    pub fn distance_to(&self, location: &GpsPoint) -> f64 {
        haversine_distance(&self.coordinate, location)
    }

    /// Distinct, non-empty localized names of the connected roads, first seen first.
    pub fn localized_road_names<L: RoadLookup + ?Sized>(&self, lookup: &L) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for road in self.roads(lookup) {
            if !road.localized_name.is_empty() && !names.contains(&road.localized_name) {
                names.push(road.localized_name.clone());
            }
        }
        names
    }

    /// Display name, e.g. "Pike Street and 3rd Avenue".
    pub fn localized_name<L: RoadLookup + ?Sized>(&self, lookup: &L) -> String {
        join_names(&self.localized_road_names(lookup))
    }

    /// Display name without `excluded`, unless it is the only road name.
    pub fn localized_name_excluding<L: RoadLookup + ?Sized>(&self, lookup: &L, excluded: Option<&str>) -> String {
        let mut names = self.localized_road_names(lookup);
        if let Some(excluded) = excluded {
            let remaining: Vec<String> = names.iter().filter(|n| *n != excluded).cloned().collect();
            if !remaining.is_empty() {
                names = remaining;
            }
        }
        join_names(&names)
    }

    /// Whether any connected road has the localized name `name`.
    pub fn includes_road<L: RoadLookup + ?Sized>(&self, name: &str, lookup: &L) -> bool {
        self.roads(lookup).iter().any(|r| r.localized_name == name)
    }

    /// Whether any connected road is part of a roundabout.
    pub fn is_part_of_roundabout<L: RoadLookup + ?Sized>(&self, lookup: &L) -> bool {
        self.roads(lookup).iter().any(|r| r.roundabout)
    }

    // ------------------------------------------------------------------------
    // Classification
    // ------------------------------------------------------------------------

    /// Whether this intersection is significant enough to announce.
    pub fn is_main<L, P>(&self, lookup: &L, policy: &P, context: SecondaryRoadsContext) -> bool
    where
        L: RoadLookup + ?Sized,
        P: RoadImportancePolicy + ?Sized,
    {
        self.has_distinct_main_roads(lookup, policy, context)
            || self.is_main_with_close(lookup, policy, context)
            || self.is_main_on_roundabout(lookup, policy, context)
            || self.has_road_type_change(lookup)
            || self.is_t_intersection_with_same_road(lookup)
    }

    /// At least two distinct localized names among the main roads.
    pub fn has_distinct_main_roads<L, P>(&self, lookup: &L, policy: &P, context: SecondaryRoadsContext) -> bool
    where
        L: RoadLookup + ?Sized,
        P: RoadImportancePolicy + ?Sized,
    {
        self.roads(lookup)
            .into_iter()
            .filter(|r| policy.is_main(r, context))
            .map(|r| r.localized_name.as_str())
            .collect::<HashSet<_>>()
            .len()
            >= 2
    }

    /// At least two distinct main segments (they may share a name), one of which is a close.
    pub fn is_main_with_close<L, P>(&self, lookup: &L, policy: &P, context: SecondaryRoadsContext) -> bool
    where
        L: RoadLookup + ?Sized,
        P: RoadImportancePolicy + ?Sized,
    {
        let main: Vec<&Road> = self
            .roads(lookup)
            .into_iter()
            .filter(|r| policy.is_main(r, context))
            .collect();

        let distinct_keys: HashSet<&str> = main.iter().map(|r| r.key.as_str()).collect();
        if distinct_keys.len() < 2 {
            return false;
        }
        main.iter().any(|r| r.is_circular())
    }

    /// On a roundabout with at least one main road attached. Roundabouts are often
    /// mapped as unnamed service roads, so the roundabout itself need not be main.
    pub fn is_main_on_roundabout<L, P>(&self, lookup: &L, policy: &P, context: SecondaryRoadsContext) -> bool
    where
        L: RoadLookup + ?Sized,
        P: RoadImportancePolicy + ?Sized,
    {
        let roads = self.roads(lookup);
        roads.iter().any(|r| r.roundabout) && roads.iter().any(|r| policy.is_main(r, context))
    }

    /// Two named segments share a name but not a road type, e.g. a service road
    /// that continues as a primary road.
    pub fn has_road_type_change<L: RoadLookup + ?Sized>(&self, lookup: &L) -> bool {
        let named: Vec<&Road> = self
            .roads(lookup)
            .into_iter()
            .filter(|r| !r.name.is_empty())
            .collect();

        named.iter().any(|road| {
            named
                .iter()
                .any(|other| other.key != road.key && other.name == road.name && other.road_type != road.road_type)
        })
    }

    /// One segment ends here and a different segment with the same name does not
    /// end here: the stem and bar of a "T" formed by one street.
    pub fn is_t_intersection_with_same_road<L: RoadLookup + ?Sized>(&self, lookup: &L) -> bool {
        let roads = self.roads(lookup);

        roads.iter().any(|stem| {
            if !stem.touches_at_end(&self.coordinate) {
                return false;
            }
            roads.iter().any(|bar| {
                bar.key != stem.key
                    && bar.name == stem.name
                    && !bar.touches_at_end(&self.coordinate)
            })
        })
    }
}

/// English list of names: "A", "A and B", "A, B, and C".
fn join_names(names: &[String]) -> String {
    match names {
        [] => UNNAMED_INTERSECTION.to_string(),
        [only] => only.clone(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}

// ============================================================================
// Filtering
// ============================================================================

/// Criteria for [`filter_intersections`].
#[derive(Debug, Clone, Copy)]
pub struct IntersectionFilter<'a> {
    /// Direction of travel. Unknown headings skip the field of view check.
    pub heading: Heading,
    /// Total width of the cone around `heading`, in degrees.
    pub field_of_view: f64,
    /// Maximum distance in meters. `None` or a non-positive value disables the check.
    pub max_distance: Option<f64>,
    /// Only keep intersections that include a road with this localized name.
    pub road_name: Option<&'a str>,
    pub context: SecondaryRoadsContext,
}

impl Default for IntersectionFilter<'_> {
    fn default() -> Self {
        Self {
            heading: Heading::UNKNOWN,
            field_of_view: 90.0,
            max_distance: None,
            road_name: None,
            context: SecondaryRoadsContext::Standard,
        }
    }
}

impl IntersectionFilter<'_> {
    /// Whether `target`, seen from `location`, lies inside the field of view.
    fn faces(&self, location: &GpsPoint, target: &GpsPoint) -> bool {
        let Some(heading) = self.heading.value() else {
            return true;
        };
        match bearing(location, target) {
            Some(b) => angle_difference(heading, b).abs() <= self.field_of_view / 2.0,
            None => false,
        }
    }
}

/// Main intersections matching `filter`, closest first (ties by key).
///
/// ```text
///  \    x    /  - (x) intersections
///   \     x /
///    \ x   /    - (\/) field of view
///     \   /
///       ↑       - (↑) heading
///       o       - (o) location
/// ```
pub fn filter_intersections<'a, L, P>(
    intersections: &[&'a Intersection],
    lookup: &L,
    location: &GpsPoint,
    filter: &IntersectionFilter<'_>,
    policy: &P,
) -> Vec<&'a Intersection>
where
    L: RoadLookup + ?Sized,
    P: RoadImportancePolicy + ?Sized,
{
    let mut survivors: Vec<(&'a Intersection, f64)> = intersections
        .iter()
        .map(|&i| (i, i.distance_to(location)))
        .filter(|(_, distance)| match filter.max_distance {
            Some(max) if max > 0.0 => *distance <= max,
            _ => true,
        })
        .filter(|(i, _)| filter.faces(location, &i.coordinate))
        .filter(|(i, _)| match filter.road_name {
            Some(name) => i.includes_road(name, lookup),
            None => true,
        })
        .filter(|(i, _)| i.is_main(lookup, policy, filter.context))
        .collect();

    survivors.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.key.cmp(&b.0.key)));

    debug!(
        "[Intersection] {} of {} intersections pass the filter",
        survivors.len(),
        intersections.len()
    );

    survivors.into_iter().map(|(i, _)| i).collect()
}

/// The intersection closest to `location`. The first one wins a tie.
pub fn find_closest<'a>(intersections: &'a [Intersection], location: &GpsPoint) -> Option<&'a Intersection> {
    let mut closest = None;
    let mut min_distance = f64::MAX;

    for intersection in intersections {
        let distance = intersection.distance_to(location);
        if distance < min_distance {
            closest = Some(intersection);
            min_distance = distance;
        }
    }

    closest
}

/// Map data sometimes describes one intersection with several records at the same
/// coordinate, each listing a subset of the roads. Returns the record at
/// `intersection`'s coordinate with the most distinct roads; the first such
/// record in `intersections` on a tie.
pub fn resolve_duplicate_records<'a>(
    intersection: &'a Intersection,
    intersections: &'a [Intersection],
) -> &'a Intersection {
    let similar: Vec<&Intersection> = intersections
        .iter()
        .filter(|i| i.coordinate.same_location(&intersection.coordinate))
        .collect();

    if similar.len() < 2 {
        return intersection;
    }

    warn!(
        "[Intersection] Intersection at {} is represented by {} records: {}",
        intersection.coordinate,
        similar.len(),
        similar.iter().map(|i| i.key.as_str()).collect::<Vec<_>>().join(", ")
    );

    // Strictly more roads wins, so ties go to the first record in data order
    let mut best = similar[0];
    for &candidate in &similar[1..] {
        if candidate.distinct_road_count() > best.distinct_road_count() {
            best = candidate;
        }
    }
    best
}

/// Every intersection replaced by its most complete record, each record once.
pub fn deduplicate_records(intersections: &[Intersection]) -> Vec<&Intersection> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut resolved = Vec::with_capacity(intersections.len());

    for intersection in intersections {
        let best = resolve_duplicate_records(intersection, intersections);
        if seen.insert(best.key.as_str()) {
            resolved.push(best);
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_join_names() {
        assert_eq!(join_names(&[]), "Intersection");
        assert_eq!(join_names(&names(&["Pike"])), "Pike");
        assert_eq!(join_names(&names(&["Pike", "3rd"])), "Pike and 3rd");
        assert_eq!(join_names(&names(&["Pike", "3rd", "Pine"])), "Pike, 3rd, and Pine");
    }
}
