//! Tests for nearest_road module

use approx::assert_abs_diff_eq;
use roadside::{GpsPoint, Road, find_nearest_roads};

fn east_west(key: &str, name: &str, lat: f64) -> Road {
    Road::new(
        key,
        name,
        "primary",
        vec![
            GpsPoint::new(lat, -122.3420),
            GpsPoint::new(lat, -122.3400),
            GpsPoint::new(lat, -122.3380),
        ],
    )
}

#[test]
fn test_closest_of_two_parallel_roads() {
    let roads = vec![
        east_west("a", "Pike Street", 47.6100),
        east_west("b", "Pine Street", 47.6102),
    ];
    let location = GpsPoint::new(47.61005, -122.3395);

    let result = find_nearest_roads(&location, &roads, None);
    let closest = result.closest.unwrap();

    assert_eq!(closest.road.key, "a");
    assert_abs_diff_eq!(closest.distance, 5.56, epsilon = 0.05);
    assert_abs_diff_eq!(closest.point.latitude, 47.6100, epsilon = 1e-7);
    assert_abs_diff_eq!(closest.point.longitude, -122.3395, epsilon = 1e-7);
    assert!(result.sticky.is_none());
}

#[test]
fn test_sticky_match_is_tracked_separately() {
    let roads = vec![
        east_west("a", "Pike Street", 47.6100),
        east_west("b", "Pine Street", 47.6102),
    ];
    let location = GpsPoint::new(47.61005, -122.3395);

    let result = find_nearest_roads(&location, &roads, Some("Pine Street"));

    assert_eq!(result.closest.unwrap().road.key, "a");
    let sticky = result.sticky.unwrap();
    assert_eq!(sticky.road.key, "b");
    assert_abs_diff_eq!(sticky.distance, 16.7, epsilon = 0.1);
    assert!(sticky.nearest_vertex.is_none());
}

#[test]
fn test_sticky_name_matches_every_segment_of_a_street() {
    // The street is split in two segments; the sticky match is on the nearer one
    let west = Road::new(
        "pine-w",
        "Pine Street",
        "primary",
        vec![GpsPoint::new(47.6102, -122.3440), GpsPoint::new(47.6102, -122.3420)],
    );
    let east = Road::new(
        "pine-e",
        "Pine Street",
        "primary",
        vec![GpsPoint::new(47.6102, -122.3420), GpsPoint::new(47.6102, -122.3400)],
    );
    let roads = vec![west, east, east_west("a", "Pike Street", 47.6100)];

    let result = find_nearest_roads(&GpsPoint::new(47.6101, -122.3410), &roads, Some("Pine Street"));
    assert_eq!(result.sticky.unwrap().road.key, "pine-e");
}

#[test]
fn test_unknown_sticky_name_yields_no_sticky_match() {
    let roads = vec![east_west("a", "Pike Street", 47.6100)];
    let result = find_nearest_roads(&GpsPoint::new(47.6101, -122.3400), &roads, Some("Elm Street"));
    assert!(result.closest.is_some());
    assert!(result.sticky.is_none());
}

#[test]
fn test_degenerate_roads_are_ignored() {
    let location = GpsPoint::new(47.6100, -122.3400);
    let roads = vec![
        Road::new("dot", "Dot Lane", "primary", vec![location]),
        Road::new("empty", "Empty Lane", "primary", vec![]),
    ];

    let result = find_nearest_roads(&location, &roads, Some("Dot Lane"));
    assert!(result.closest.is_none());
    assert!(result.sticky.is_none());
}

#[test]
fn test_empty_input() {
    let roads: Vec<Road> = Vec::new();
    let result = find_nearest_roads(&GpsPoint::new(0.0, 0.0), &roads, None);
    assert!(result.closest.is_none());
}

#[test]
fn test_equal_distance_tie_goes_to_smaller_key() {
    let location = GpsPoint::new(47.6101, -122.3400);
    let forward = vec![
        east_west("zeta", "Pike Street", 47.6100),
        east_west("alpha", "Pike Street", 47.6100),
    ];
    let backward: Vec<Road> = forward.iter().rev().cloned().collect();

    assert_eq!(find_nearest_roads(&location, &forward, None).closest.unwrap().road.key, "alpha");
    assert_eq!(find_nearest_roads(&location, &backward, None).closest.unwrap().road.key, "alpha");
}

#[test]
fn test_nearest_vertex_is_endpoint_of_winning_segment() {
    let roads = vec![east_west("a", "Pike Street", 47.6100)];

    // Snaps inside the eastern segment, closer to its western end
    let result = find_nearest_roads(&GpsPoint::new(47.61003, -122.3395), &roads, None);
    assert_eq!(result.closest.unwrap().nearest_vertex, Some(GpsPoint::new(47.6100, -122.3400)));

    // Closer to the eastern end
    let result = find_nearest_roads(&GpsPoint::new(47.61003, -122.3383), &roads, None);
    assert_eq!(result.closest.unwrap().nearest_vertex, Some(GpsPoint::new(47.6100, -122.3380)));
}

#[test]
fn test_beyond_road_end_snaps_to_endpoint() {
    let roads = vec![east_west("a", "Pike Street", 47.6100)];
    let result = find_nearest_roads(&GpsPoint::new(47.6100, -122.3370), &roads, None);
    let closest = result.closest.unwrap();

    assert_abs_diff_eq!(closest.point.longitude, -122.3380, epsilon = 1e-7);
    // 0.001 degrees of longitude at this latitude
    assert_abs_diff_eq!(closest.distance, 75.1, epsilon = 0.5);
}
