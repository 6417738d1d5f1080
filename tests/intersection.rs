//! Tests for intersection classification, naming and filtering

use std::collections::HashMap;

use roadside::geo_utils::destination;
use roadside::intersection::{
    IntersectionFilter, deduplicate_records, filter_intersections, find_closest, resolve_duplicate_records,
};
use roadside::{
    GpsPoint, Heading, Intersection, Road, SecondaryRoadPolicy, SecondaryRoadsContext, SpatialSnapshot,
};

const STANDARD: SecondaryRoadsContext = SecondaryRoadsContext::Standard;

fn node() -> GpsPoint {
    GpsPoint::new(47.6100, -122.3400)
}

fn pt(lat: f64, lon: f64) -> GpsPoint {
    GpsPoint::new(lat, lon)
}

fn intersection_of(key: &str, coordinate: GpsPoint, roads: &[Road]) -> Intersection {
    Intersection::new(key, coordinate, roads.iter().map(|r| r.key.clone()).collect())
}

/// Pike Street (east-west) crossing 3rd Avenue (north-south), each split at the node.
fn pike_and_third() -> (Vec<Road>, Intersection) {
    let roads = vec![
        Road::new("pike-w", "Pike Street", "primary", vec![pt(47.6100, -122.3410), node()]),
        Road::new("pike-e", "Pike Street", "primary", vec![node(), pt(47.6100, -122.3390)]),
        Road::new("third-s", "3rd Avenue", "primary", vec![pt(47.6090, -122.3400), node()]),
        Road::new("third-n", "3rd Avenue", "primary", vec![node(), pt(47.6110, -122.3400)]),
    ];
    let intersection = intersection_of("node", node(), &roads);
    (roads, intersection)
}

/// Two named streets crossing at `center`, each passing through it.
fn crossing(key: &str, center: GpsPoint) -> (Vec<Road>, Intersection) {
    let ew = Road::new(
        format!("{key}-ew"),
        format!("{key} Street"),
        "primary",
        vec![
            pt(center.latitude, center.longitude - 0.0005),
            center,
            pt(center.latitude, center.longitude + 0.0005),
        ],
    );
    let ns = Road::new(
        format!("{key}-ns"),
        format!("{key} Avenue"),
        "primary",
        vec![
            pt(center.latitude - 0.0005, center.longitude),
            center,
            pt(center.latitude + 0.0005, center.longitude),
        ],
    );
    let roads = vec![ew, ns];
    let intersection = intersection_of(key, center, &roads);
    (roads, intersection)
}

fn lookup(roads: Vec<Road>) -> HashMap<String, Road> {
    roads.into_iter().map(|r| (r.key.clone(), r)).collect()
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn test_distinct_main_roads() {
    let (roads, intersection) = pike_and_third();
    let lookup = lookup(roads);
    let policy = SecondaryRoadPolicy::default();

    assert!(intersection.has_distinct_main_roads(&lookup, &policy, STANDARD));
    assert!(intersection.is_main(&lookup, &policy, STANDARD));
    assert!(!intersection.has_road_type_change(&lookup));
}

#[test]
fn test_secondary_roads_meeting_is_not_main() {
    let roads = vec![
        Road::new("path", "", "walking_path", vec![pt(47.6095, -122.3400), node()]),
        Road::new("service", "", "service_road", vec![node(), pt(47.6100, -122.3390)]),
    ];
    let intersection = intersection_of("minor", node(), &roads);
    let lookup = lookup(roads);
    let policy = SecondaryRoadPolicy::default();

    assert!(!intersection.has_distinct_main_roads(&lookup, &policy, STANDARD));
    assert!(!intersection.is_main_with_close(&lookup, &policy, STANDARD));
    assert!(!intersection.is_main_on_roundabout(&lookup, &policy, STANDARD));
    assert!(!intersection.has_road_type_change(&lookup));
    assert!(!intersection.is_t_intersection_with_same_road(&lookup));
    assert!(!intersection.is_main(&lookup, &policy, STANDARD));
}

#[test]
fn test_named_roads_are_main_even_when_secondary_type() {
    let roads = vec![
        Road::new("trail", "Burke Trail", "walking_path", vec![pt(47.6095, -122.3400), node()]),
        Road::new("lane", "Mill Lane", "service_road", vec![node(), pt(47.6100, -122.3390)]),
    ];
    let intersection = intersection_of("trailhead", node(), &roads);
    let lookup = lookup(roads);

    assert!(intersection.is_main(&lookup, &SecondaryRoadPolicy::default(), SecondaryRoadsContext::Strict));
}

#[test]
fn test_main_with_close() {
    let roads = vec![
        Road::new(
            "maple-loop",
            "Maple Close",
            "residential_street",
            vec![node(), pt(47.6101, -122.3400), pt(47.6101, -122.3398), node()],
        ),
        Road::new("maple-access", "Maple Close", "residential_street", vec![pt(47.6095, -122.3400), node()]),
    ];
    let intersection = intersection_of("maple", node(), &roads);
    let lookup = lookup(roads);
    let policy = SecondaryRoadPolicy::default();

    assert!(!intersection.has_distinct_main_roads(&lookup, &policy, STANDARD));
    assert!(!intersection.is_t_intersection_with_same_road(&lookup));
    assert!(intersection.is_main_with_close(&lookup, &policy, STANDARD));
    assert!(intersection.is_main(&lookup, &policy, STANDARD));
}

#[test]
fn test_close_alone_is_not_main() {
    // Only one distinct segment, even though it is listed twice
    let close = Road::new(
        "loop",
        "Maple Close",
        "residential_street",
        vec![node(), pt(47.6101, -122.3400), pt(47.6101, -122.3398), node()],
    );
    let intersection = Intersection::new("loop-node", node(), vec!["loop".into(), "loop".into()]);
    let lookup = lookup(vec![close]);

    assert!(!intersection.is_main_with_close(&lookup, &SecondaryRoadPolicy::default(), STANDARD));
}

#[test]
fn test_main_on_roundabout() {
    let ring = Road::new(
        "ring",
        "",
        "service_road",
        vec![pt(47.6099, -122.3401), node(), pt(47.6099, -122.3399)],
    )
    .with_roundabout(true);
    let oak = Road::new("oak", "Oak Street", "residential_street", vec![node(), pt(47.6105, -122.3400)]);
    let path = Road::new("path", "", "walking_path", vec![node(), pt(47.6105, -122.3400)]);

    let strict = SecondaryRoadsContext::Strict;
    let policy = SecondaryRoadPolicy::default();

    let with_street = intersection_of("ring-oak", node(), &[ring.clone(), oak.clone()]);
    let lookup_street = lookup(vec![ring.clone(), oak]);
    assert!(with_street.is_part_of_roundabout(&lookup_street));
    assert!(!with_street.has_distinct_main_roads(&lookup_street, &policy, strict));
    assert!(with_street.is_main_on_roundabout(&lookup_street, &policy, strict));
    assert!(with_street.is_main(&lookup_street, &policy, strict));

    let with_path = intersection_of("ring-path", node(), &[ring.clone(), path.clone()]);
    let lookup_path = lookup(vec![ring, path]);
    assert!(!with_path.is_main_on_roundabout(&lookup_path, &policy, strict));
}

#[test]
fn test_road_type_change() {
    let roads = vec![
        Road::new("bell-a", "Bell Street", "service_road", vec![pt(47.6100, -122.3410), node()]),
        Road::new("bell-b", "Bell Street", "primary", vec![node(), pt(47.6100, -122.3390)]),
    ];
    let intersection = intersection_of("bell", node(), &roads);
    let lookup = lookup(roads);
    let policy = SecondaryRoadPolicy::default();

    assert!(!intersection.has_distinct_main_roads(&lookup, &policy, STANDARD));
    assert!(!intersection.is_t_intersection_with_same_road(&lookup));
    assert!(intersection.has_road_type_change(&lookup));
    assert!(intersection.is_main(&lookup, &policy, STANDARD));
}

#[test]
fn test_plain_continuation_is_not_main() {
    let roads = vec![
        Road::new("bell-a", "Bell Street", "primary", vec![pt(47.6100, -122.3410), node()]),
        Road::new("bell-b", "Bell Street", "primary", vec![node(), pt(47.6100, -122.3390)]),
    ];
    let intersection = intersection_of("bell", node(), &roads);
    let lookup = lookup(roads);

    assert!(!intersection.is_main(&lookup, &SecondaryRoadPolicy::default(), STANDARD));
}

#[test]
fn test_t_intersection_with_same_road() {
    let roads = vec![
        Road::new(
            "elm-bar",
            "Elm Street",
            "residential_street",
            vec![pt(47.6100, -122.3410), node(), pt(47.6100, -122.3390)],
        ),
        Road::new("elm-stem", "Elm Street", "residential_street", vec![node(), pt(47.6110, -122.3400)]),
    ];
    let intersection = intersection_of("elm", node(), &roads);
    let lookup = lookup(roads);

    // Holds even when no road counts as main
    let never_main = |_: &Road, _: SecondaryRoadsContext| false;
    assert!(!intersection.has_distinct_main_roads(&lookup, &never_main, STANDARD));
    assert!(intersection.is_t_intersection_with_same_road(&lookup));
    assert!(intersection.is_main(&lookup, &never_main, STANDARD));
}

#[test]
fn test_unknown_road_keys_are_skipped() {
    let (roads, _) = pike_and_third();
    let intersection = Intersection::new("partial", node(), vec!["pike-w".into(), "gone".into()]);
    let lookup = lookup(roads);

    assert_eq!(intersection.roads(&lookup).len(), 1);
    assert_eq!(intersection.distinct_road_count(), 2);
    assert!(!intersection.is_main(&lookup, &SecondaryRoadPolicy::default(), STANDARD));
}

// ============================================================================
// Names
// ============================================================================

#[test]
fn test_localized_name() {
    let (roads, intersection) = pike_and_third();
    let lookup = lookup(roads);

    assert_eq!(intersection.localized_road_names(&lookup), vec!["Pike Street", "3rd Avenue"]);
    assert_eq!(intersection.localized_name(&lookup), "Pike Street and 3rd Avenue");
    assert!(intersection.includes_road("3rd Avenue", &lookup));
    assert!(!intersection.includes_road("Pine Street", &lookup));
}

#[test]
fn test_localized_name_excluding() {
    let (roads, intersection) = pike_and_third();
    let lookup = lookup(roads);

    assert_eq!(intersection.localized_name_excluding(&lookup, Some("Pike Street")), "3rd Avenue");
    assert_eq!(intersection.localized_name_excluding(&lookup, Some("Elm Street")), "Pike Street and 3rd Avenue");
    assert_eq!(intersection.localized_name_excluding(&lookup, None), "Pike Street and 3rd Avenue");

    // The only name is never removed
    let lonely = Intersection::new("pike-only", node(), vec!["pike-w".into(), "pike-e".into()]);
    assert_eq!(lonely.localized_name_excluding(&lookup, Some("Pike Street")), "Pike Street");
}

#[test]
fn test_localized_name_follows_lookup() {
    let (roads, intersection) = pike_and_third();
    let full = lookup(roads.clone());
    let pike_only = lookup(roads.into_iter().filter(|r| r.name == "Pike Street").collect());

    assert_eq!(intersection.localized_name(&full), "Pike Street and 3rd Avenue");
    assert_eq!(intersection.localized_name(&pike_only), "Pike Street");
    assert_eq!(intersection.localized_name(&full), "Pike Street and 3rd Avenue");
}

#[test]
fn test_unnamed_intersection() {
    let intersection = Intersection::new("nowhere", node(), vec!["missing".into()]);
    let lookup: HashMap<String, Road> = HashMap::new();
    assert_eq!(intersection.localized_name(&lookup), "Intersection");
}

#[test]
fn test_unnamed_roads_use_type_labels() {
    let roads = vec![
        Road::new("path", "", "walking_path", vec![pt(47.6095, -122.3400), node()]),
        Road::new("pike", "Pike Street", "primary", vec![node(), pt(47.6100, -122.3390)]),
    ];
    let intersection = intersection_of("n", node(), &roads);
    let lookup = lookup(roads);
    assert_eq!(intersection.localized_name(&lookup), "Walking Path and Pike Street");
}

// ============================================================================
// Filtering
// ============================================================================

/// Main intersections 100m north, 150m east and 200m south of the origin.
fn compass_snapshot() -> (GpsPoint, SpatialSnapshot) {
    let origin = node();
    let mut roads = Vec::new();
    let mut intersections = Vec::new();
    for (key, distance, bearing) in [("north", 100.0, 0.0), ("east", 150.0, 90.0), ("south", 200.0, 180.0)] {
        let (r, i) = crossing(key, destination(&origin, distance, bearing));
        roads.extend(r);
        intersections.push(i);
    }
    (origin, SpatialSnapshot::new(roads, vec![], intersections))
}

fn keys(list: &[&Intersection]) -> Vec<String> {
    list.iter().map(|i| i.key.clone()).collect()
}

#[test]
fn test_filter_by_field_of_view() {
    let (origin, snapshot) = compass_snapshot();
    let candidates: Vec<&Intersection> = snapshot.intersections.iter().collect();
    let policy = SecondaryRoadPolicy::default();

    let ahead = IntersectionFilter {
        heading: Heading::new(0.0),
        ..Default::default()
    };
    assert_eq!(keys(&filter_intersections(&candidates, &snapshot, &origin, &ahead, &policy)), vec!["north"]);

    let east = IntersectionFilter {
        heading: Heading::new(100.0),
        ..Default::default()
    };
    assert_eq!(keys(&filter_intersections(&candidates, &snapshot, &origin, &east, &policy)), vec!["east"]);

    // 30 degrees off north is inside the 90 degree cone, 60 degrees off east is not
    let slanted = IntersectionFilter {
        heading: Heading::new(30.0),
        ..Default::default()
    };
    assert_eq!(keys(&filter_intersections(&candidates, &snapshot, &origin, &slanted, &policy)), vec!["north"]);
}

#[test]
fn test_filter_unknown_heading_keeps_all_sorted_by_distance() {
    let (origin, snapshot) = compass_snapshot();
    let candidates: Vec<&Intersection> = snapshot.intersections.iter().rev().collect();

    let found = filter_intersections(
        &candidates,
        &snapshot,
        &origin,
        &IntersectionFilter::default(),
        &SecondaryRoadPolicy::default(),
    );
    assert_eq!(keys(&found), vec!["north", "east", "south"]);
}

#[test]
fn test_filter_by_distance_and_road() {
    let (origin, snapshot) = compass_snapshot();
    let candidates: Vec<&Intersection> = snapshot.intersections.iter().collect();
    let policy = SecondaryRoadPolicy::default();

    let near = IntersectionFilter {
        max_distance: Some(160.0),
        ..Default::default()
    };
    assert_eq!(keys(&filter_intersections(&candidates, &snapshot, &origin, &near, &policy)), vec!["north", "east"]);

    // Non-positive limits disable the check
    let unlimited = IntersectionFilter {
        max_distance: Some(0.0),
        ..Default::default()
    };
    assert_eq!(filter_intersections(&candidates, &snapshot, &origin, &unlimited, &policy).len(), 3);

    let on_road = IntersectionFilter {
        road_name: Some("south Avenue"),
        ..Default::default()
    };
    assert_eq!(keys(&filter_intersections(&candidates, &snapshot, &origin, &on_road, &policy)), vec!["south"]);
}

#[test]
fn test_filter_drops_minor_intersections() {
    let origin = node();
    let minor_at = destination(&origin, 50.0, 0.0);
    let roads = vec![
        Road::new("path-a", "", "walking_path", vec![origin, minor_at]),
        Road::new("path-b", "", "walking_path", vec![minor_at, destination(&minor_at, 50.0, 90.0)]),
    ];
    let minor = intersection_of("minor", minor_at, &roads);
    let (major_roads, major) = crossing("major", destination(&origin, 120.0, 0.0));

    let all_roads: Vec<Road> = roads.into_iter().chain(major_roads).collect();
    let snapshot = SpatialSnapshot::new(all_roads, vec![], vec![minor, major]);
    let candidates: Vec<&Intersection> = snapshot.intersections.iter().collect();

    let filter = IntersectionFilter {
        heading: Heading::new(0.0),
        ..Default::default()
    };
    let found = filter_intersections(&candidates, &snapshot, &origin, &filter, &SecondaryRoadPolicy::default());
    assert_eq!(keys(&found), vec!["major"]);
}

#[test]
fn test_filter_ties_ordered_by_key() {
    let origin = node();
    let center = destination(&origin, 80.0, 0.0);
    let (roads, template) = crossing("x", center);
    let b = Intersection::new("b-record", center, template.road_keys.clone());
    let a = Intersection::new("a-record", center, template.road_keys.clone());
    let snapshot = SpatialSnapshot::new(roads, vec![], vec![b, a]);
    let candidates: Vec<&Intersection> = snapshot.intersections.iter().collect();

    let found = filter_intersections(
        &candidates,
        &snapshot,
        &origin,
        &IntersectionFilter::default(),
        &SecondaryRoadPolicy::default(),
    );
    assert_eq!(keys(&found), vec!["a-record", "b-record"]);
}

// ============================================================================
// Closest and duplicate records
// ============================================================================

#[test]
fn test_find_closest() {
    let origin = node();
    let list = vec![
        Intersection::new("far", destination(&origin, 300.0, 0.0), vec![]),
        Intersection::new("near", destination(&origin, 20.0, 200.0), vec![]),
        Intersection::new("near-copy", destination(&origin, 20.0, 200.0), vec![]),
    ];

    assert_eq!(find_closest(&list, &origin).unwrap().key, "near");
    assert!(find_closest(&[], &origin).is_none());
}

#[test]
fn test_resolve_duplicate_records() {
    let other = destination(&node(), 100.0, 90.0);
    let records = vec![
        Intersection::new("partial", node(), vec!["pike-w".into()]),
        Intersection::new("full", node(), vec!["pike-w".into(), "third-n".into(), "third-n".into(), "pike-e".into()]),
        Intersection::new("elsewhere", other, vec!["x".into()]),
    ];

    assert_eq!(resolve_duplicate_records(&records[0], &records).key, "full");
    assert_eq!(resolve_duplicate_records(&records[1], &records).key, "full");
    assert_eq!(resolve_duplicate_records(&records[2], &records).key, "elsewhere");

    let deduplicated = deduplicate_records(&records);
    assert_eq!(keys(&deduplicated), vec!["full", "elsewhere"]);
}

#[test]
fn test_duplicate_records_tie_keeps_first() {
    let records = vec![
        Intersection::new("first", node(), vec!["a".into(), "b".into()]),
        Intersection::new("second", node(), vec!["c".into(), "d".into()]),
    ];

    assert_eq!(resolve_duplicate_records(&records[1], &records).key, "first");
    assert_eq!(keys(&deduplicate_records(&records)), vec!["first"]);
}
