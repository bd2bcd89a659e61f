//! Current position and address lookups.
//!
//! Everything here is best effort: a missing position or address is a
//! normal outcome and is reported as None, never as an error.

pub mod geocoding;

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::config::AppConfig;
use crate::models::{Coordinates, Position};

pub use geocoding::{maps_search_url, Geocoder};

/// Source of single-shot position fixes
pub trait LocationProvider: Send + Sync {
    /// A position, or None if unavailable or permission was denied
    fn current_position(&self) -> impl Future<Output = Option<Position>> + Send;
}

/// Provider returning a preconfigured position, e.g. from CLI arguments
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocation(pub Option<Position>);

impl FixedLocation {
    pub fn at(lat: f64, lng: f64) -> Self {
        Self(Some(Position {
            coordinates: Coordinates { lat, lng },
            accuracy_m: None,
        }))
    }
}

impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Option<Position> {
        self.0
    }
}

/// Wraps a provider with a timeout and reuse of recent fixes
pub struct Locator<P> {
    provider: P,
    timeout: Duration,
    max_age: Duration,
    last_fix: Mutex<Option<(Position, Instant)>>,
}

impl<P: LocationProvider> Locator<P> {
    pub fn new(provider: P, timeout: Duration, max_age: Duration) -> Self {
        Self {
            provider,
            timeout,
            max_age,
            last_fix: Mutex::new(None),
        }
    }

    pub fn from_config(provider: P, config: &AppConfig) -> Self {
        Self::new(provider, config.location_timeout(), config.location_max_age())
    }

    /// Returns a fix no older than the max age, asking the provider if needed.
    pub async fn current_position(&self) -> Option<Position> {
        if let Some(position) = self.recent_fix() {
            log::debug!("Reusing cached position {:?}", position.coordinates);
            return Some(position);
        }

        match tokio::time::timeout(self.timeout, self.provider.current_position()).await {
            Ok(Some(position)) => {
                log::debug!("Got position {:?}", position.coordinates);
                *self.last_fix.lock().unwrap_or_else(PoisonError::into_inner) =
                    Some((position, Instant::now()));
                Some(position)
            }
            Ok(None) => {
                log::warn!("Location unavailable");
                None
            }
            Err(_) => {
                log::warn!("Location request timed out after {:?}", self.timeout);
                None
            }
        }
    }

    fn recent_fix(&self) -> Option<Position> {
        let last_fix = self.last_fix.lock().unwrap_or_else(PoisonError::into_inner);
        (*last_fix)
            .filter(|(_, at)| at.elapsed() < self.max_age)
            .map(|(position, _)| position)
    }
}

/// Why the "use my location" action could not fill in an address
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("You need to be online to get your current location")]
    Offline,
    #[error("Could not get your location. Please check permissions and try again.")]
    Unavailable,
    #[error("Could not determine address from your location. Please enter manually.")]
    NoAddress,
}

/// Current position plus its street address, for prefilling a place form
pub async fn address_from_current_location<P: LocationProvider>(
    locator: &Locator<P>,
    geocoder: &Geocoder,
    online: bool,
) -> Result<(String, Coordinates), LocationError> {
    if !online {
        return Err(LocationError::Offline);
    }
    let position = locator
        .current_position()
        .await
        .ok_or(LocationError::Unavailable)?;
    let address = geocoder
        .reverse_geocode(position.coordinates)
        .await
        .ok_or(LocationError::NoAddress)?;
    Ok((address, position.coordinates))
}
