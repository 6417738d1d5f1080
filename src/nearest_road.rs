//! Nearest road search.
//!
//! Runs on every location update, so the inner loop works in Web-Mercator pixel
//! space (see [`crate::projection`]) and only converts the winning squared
//! distances to meters.
//!
//! Besides the globally nearest road, the search tracks the nearest point on the
//! "sticky" road, the road the user was last snapped to. The geocoder prefers it
//! near intersections so that GPS jitter does not flip the announced road.

use log::debug;

use crate::projection::{
    PixelPoint, SEARCH_ZOOM, from_pixel, ground_resolution, segment_projection, squared_distance, to_pixel,
};
use crate::{GpsPoint, Road};

/// A location snapped onto a road.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadMatch<'a> {
    pub road: &'a Road,
    /// Closest point on the road
    pub point: GpsPoint,
    /// Distance from the query location to `point`, in meters
    pub distance: f64,
    /// Endpoint of the winning segment nearest to `point`. Always a real data
    /// vertex, unlike `point`. Only set for the global match.
    pub nearest_vertex: Option<GpsPoint>,
}

/// Result of [`find_nearest_roads`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NearbyRoadSearchResult<'a> {
    /// Globally nearest road
    pub closest: Option<RoadMatch<'a>>,
    /// Nearest point on a road named like the sticky road
    pub sticky: Option<RoadMatch<'a>>,
}

#[derive(Clone, Copy)]
struct Best<'a> {
    road: &'a Road,
    dist_sq: f64,
    foot: PixelPoint,
    vertex: Option<GpsPoint>,
}

impl<'a> Best<'a> {
    /// Whether a candidate beats this one. Equal distances go to the smaller key so
    /// the result does not depend on snapshot order.
    fn loses_to(&self, road: &Road, dist_sq: f64) -> bool {
        dist_sq < self.dist_sq || (dist_sq == self.dist_sq && road.key < self.road.key)
    }

    fn into_match(self, resolution: f64) -> RoadMatch<'a> {
        RoadMatch {
            road: self.road,
            point: from_pixel(self.foot, SEARCH_ZOOM),
            distance: self.dist_sq.sqrt() * resolution,
            nearest_vertex: self.vertex,
        }
    }
}

/// Find the road nearest to `location`, and the nearest point on roads whose
/// localized name is `sticky_name`.
///
/// Roads with fewer than two coordinates are ignored.
pub fn find_nearest_roads<'a, I>(
    location: &GpsPoint,
    roads: I,
    sticky_name: Option<&str>,
) -> NearbyRoadSearchResult<'a>
where
    I: IntoIterator<Item = &'a Road>,
{
    let target = to_pixel(location, SEARCH_ZOOM);
    let mut searched = 0usize;

    let mut closest: Option<Best<'a>> = None;
    let mut sticky: Option<Best<'a>> = None;

    for road in roads {
        if !road.has_segments() {
            continue;
        }
        searched += 1;
        let is_sticky = sticky_name.is_some_and(|name| road.localized_name == name);

        let pixels: Vec<PixelPoint> = road
            .coordinates
            .iter()
            .map(|c| to_pixel(c, SEARCH_ZOOM))
            .collect();

        for (i, w) in pixels.windows(2).enumerate() {
            let (dist_sq, foot) = segment_projection(target, w[0], w[1]);

            if closest.is_none_or(|best| best.loses_to(road, dist_sq)) {
                let vertex = if squared_distance(foot, w[0]) <= squared_distance(foot, w[1]) {
                    road.coordinates[i]
                } else {
                    road.coordinates[i + 1]
                };
                closest = Some(Best {
                    road,
                    dist_sq,
                    foot,
                    vertex: Some(vertex),
                });
            }

            if is_sticky && sticky.is_none_or(|best| best.loses_to(road, dist_sq)) {
                sticky = Some(Best {
                    road,
                    dist_sq,
                    foot,
                    vertex: None,
                });
            }
        }
    }

    let resolution = ground_resolution(location.latitude, SEARCH_ZOOM);
    let result = NearbyRoadSearchResult {
        closest: closest.map(|b| b.into_match(resolution)),
        sticky: sticky.map(|b| b.into_match(resolution)),
    };

    debug!(
        "[NearestRoad] {} roads searched, closest: {:?} ({:.1}m), sticky: {:?}",
        searched,
        result.closest.map(|m| m.road.key.as_str()),
        result.closest.map_or(f64::NAN, |m| m.distance),
        result.sticky.map(|m| m.road.key.as_str()),
    );

    result
}
