//! Geocoding against live data sources.
//!
//! [`ReverseGeocoder`] works on a snapshot handed to it. [`LiveGeocoder`] owns the
//! wiring around it for an application: it pulls a snapshot from a
//! [`SnapshotProvider`], the heading from a [`HeadingSource`], and starts an
//! address lookup for alongside results.

use log::{debug, info};

use crate::geocoder::address::{AddressEstimator, AddressHandle};
use crate::geocoder::result::ReverseGeocodeResult;
use crate::geocoder::{GeocoderConfig, ReverseGeocoder, StickyRoad, closest_intersection};
use crate::{
    GpsPoint, Heading, Intersection, OptionExt, Result, RoadImportancePolicy, SecondaryRoadPolicy, SnapshotProvider,
};

/// Current heading of the user, e.g. from the compass or course over ground.
pub trait HeadingSource {
    fn heading(&self) -> Heading;
}

impl HeadingSource for Heading {
    fn heading(&self) -> Heading {
        *self
    }
}

impl<F: Fn() -> Heading> HeadingSource for F {
    fn heading(&self) -> Heading {
        self()
    }
}

/// A result together with its pending address, if one was requested.
#[derive(Debug)]
pub struct Geocoded {
    pub result: ReverseGeocodeResult,
    /// Only set for alongside results, and only when an estimator is configured
    pub address: Option<AddressHandle>,
}

/// A [`ReverseGeocoder`] wired to its data sources.
pub struct LiveGeocoder<S, H, P = SecondaryRoadPolicy> {
    geocoder: ReverseGeocoder<P>,
    provider: S,
    heading: H,
    estimator: Option<Box<dyn AddressEstimator + Send + Sync>>,
}

impl<S, H> LiveGeocoder<S, H, SecondaryRoadPolicy>
where
    S: SnapshotProvider,
    H: HeadingSource,
{
    pub fn new(provider: S, heading: H, config: GeocoderConfig) -> Self {
        Self::with_geocoder(ReverseGeocoder::new(config), provider, heading)
    }
}

impl<S, H, P> LiveGeocoder<S, H, P>
where
    S: SnapshotProvider,
    H: HeadingSource,
    P: RoadImportancePolicy,
{
    pub fn with_geocoder(geocoder: ReverseGeocoder<P>, provider: S, heading: H) -> Self {
        Self {
            geocoder,
            provider,
            heading,
            estimator: None,
        }
    }

    /// Request addresses for alongside results from `estimator`.
    pub fn with_estimator(mut self, estimator: impl AddressEstimator + Send + Sync + 'static) -> Self {
        self.estimator = Some(Box::new(estimator));
        self
    }

    pub fn geocoder(&self) -> &ReverseGeocoder<P> {
        &self.geocoder
    }

    pub fn provider(&self) -> &S {
        &self.provider
    }

    pub fn sticky_road(&self) -> Option<&StickyRoad> {
        self.geocoder.sticky_road()
    }

    /// Set the destination POI key, returning the previous one.
    pub fn set_destination(&mut self, key: Option<String>) -> Option<String> {
        let previous = self.geocoder.set_destination(key);
        info!(
            "[ReverseGeocoder] Destination changed: {:?} -> {:?}",
            previous,
            self.geocoder.destination()
        );
        previous
    }

    /// Geocode `location` with the current heading.
    ///
    /// Fails with [`crate::GeocodeError::MissingSnapshot`] when the provider has no
    /// data for the location; the sticky road is left untouched in that case.
    pub fn reverse_geocode(&mut self, location: GpsPoint) -> Result<Geocoded> {
        let radius = self.geocoder.config().search_radius;
        let snapshot = self
            .provider
            .snapshot(location, radius)
            .ok_or_missing_snapshot(location.latitude, location.longitude)?;

        let heading = self.heading.heading();
        let result = self.geocoder.reverse_geocode(location, &snapshot, heading);

        let address = match (&result, &self.estimator) {
            (ReverseGeocodeResult::Alongside(_), Some(estimator)) => {
                let (sender, handle) = AddressHandle::channel();
                estimator.estimate(location, sender);
                Some(handle)
            }
            _ => None,
        };

        Ok(Geocoded { result, address })
    }

    /// See [`closest_intersection`].
    pub fn closest_intersection(&self, location: GpsPoint) -> Result<Option<Intersection>> {
        let radius = self.geocoder.config().search_radius;
        let snapshot = self
            .provider
            .snapshot(location, radius)
            .ok_or_missing_snapshot(location.latitude, location.longitude)?;

        let intersection = closest_intersection(&location, &snapshot);
        debug!(
            "[ReverseGeocoder] Closest intersection to {}: {:?}",
            location,
            intersection.as_ref().map(|i| i.key.as_str())
        );
        Ok(intersection)
    }
}
