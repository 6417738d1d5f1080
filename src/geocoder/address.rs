//! Street address estimation.
//!
//! Address lookups are slow (usually a platform or network service), so they run
//! out of band. The geocoder hands the estimator an [`AddressSender`] and returns
//! an [`AddressHandle`] to the caller straight away; the result arrives whenever
//! the estimator completes it. Nothing here retries or cancels.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use serde::{Deserialize, Serialize};

use crate::GpsPoint;

/// An estimated street address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Street name, e.g. "Pike Street"
    pub street_name: Option<String>,
    /// House number, e.g. "1501"
    pub house_number: Option<String>,
    pub locality: Option<String>,
}

impl Address {
    /// Whether the address is on `road_name`. Lookup services tend to append or
    /// abbreviate, so this is a case-insensitive containment check either way.
    pub fn matches_street(&self, road_name: &str) -> bool {
        let Some(street) = self.street_name.as_deref() else {
            return false;
        };
        if street.is_empty() || road_name.is_empty() {
            return false;
        }
        let street = street.to_lowercase();
        let road = road_name.to_lowercase();
        street.contains(&road) || road.contains(&street)
    }

    /// House number, only when the address is on `road_name`.
    pub fn house_number_on(&self, road_name: &str) -> Option<&str> {
        if self.matches_street(road_name) {
            self.house_number.as_deref()
        } else {
            None
        }
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<&str> = [&self.house_number, &self.street_name, &self.locality]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .filter(|p| !p.is_empty())
            .collect();
        f.write_str(&parts.join(" "))
    }
}

/// Looks up addresses. Implementations must not block; complete `sender` later.
pub trait AddressEstimator {
    fn estimate(&self, location: GpsPoint, sender: AddressSender);
}

/// Completion side of an address lookup.
#[derive(Debug)]
pub struct AddressSender {
    tx: oneshot::Sender<Address>,
}

impl AddressSender {
    /// Deliver the address. Does nothing if the handle was dropped.
    pub fn complete(self, address: Address) {
        let _ = self.tx.send(address);
    }

    /// Whether the caller is still waiting.
    pub fn is_wanted(&self) -> bool {
        !self.tx.is_canceled()
    }
}

/// Pending address of an alongside result. Poll it with
/// [`AddressHandle::try_address`] or `.await` it.
///
/// Resolves to `None` when the estimator dropped its sender without an address.
#[derive(Debug)]
pub struct AddressHandle {
    rx: oneshot::Receiver<Address>,
    resolved: Option<Option<Address>>,
}

impl AddressHandle {
    /// A connected sender and handle.
    pub fn channel() -> (AddressSender, AddressHandle) {
        let (tx, rx) = oneshot::channel();
        (
            AddressSender { tx },
            AddressHandle { rx, resolved: None },
        )
    }

    /// The address if the lookup has finished. `None` while pending or when the
    /// lookup failed; see [`AddressHandle::is_finished`].
    pub fn try_address(&mut self) -> Option<Address> {
        self.poll_now();
        self.resolved.clone().flatten()
    }

    /// Whether the lookup finished, with or without an address.
    pub fn is_finished(&mut self) -> bool {
        self.poll_now();
        self.resolved.is_some()
    }

    fn poll_now(&mut self) {
        if self.resolved.is_some() {
            return;
        }
        match self.rx.try_recv() {
            Ok(Some(address)) => self.resolved = Some(Some(address)),
            Ok(None) => {}
            Err(oneshot::Canceled) => self.resolved = Some(None),
        }
    }
}

impl Future for AddressHandle {
    type Output = Option<Address>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(resolved) = &self.resolved {
            return Poll::Ready(resolved.clone());
        }
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(address)) => {
                self.resolved = Some(Some(address.clone()));
                Poll::Ready(Some(address))
            }
            Poll::Ready(Err(oneshot::Canceled)) => {
                self.resolved = Some(None);
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
