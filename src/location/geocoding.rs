//! Google Geocoding API client.

use reqwest::Client;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::models::Coordinates;

const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Forward and reverse geocoding. Without an API key every lookup is None.
pub struct Geocoder {
    client: Client,
    pub(crate) base_url: String,
    api_key: Option<String>,
}

impl Geocoder {
    pub fn new(api_key: Option<String>) -> Self {
        if api_key.is_none() {
            log::info!("No Google Maps API key configured, geocoding disabled");
        }
        Self {
            client: Client::new(),
            base_url: GEOCODE_URL.to_string(),
            api_key,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Coordinates of the best match for an address
    pub async fn geocode(&self, address: &str) -> Option<Coordinates> {
        match self.lookup(&[("address", address.to_string())]).await {
            Ok(Some(result)) => {
                let location = result.geometry.location;
                log::debug!("Geocoded {:?} to {}, {}", address, location.lat, location.lng);
                Some(Coordinates {
                    lat: location.lat,
                    lng: location.lng,
                })
            }
            Ok(None) => None,
            Err(e) => {
                log::warn!("Geocoding {:?} failed: {}", address, e);
                None
            }
        }
    }

    /// Formatted street address closest to a point
    pub async fn reverse_geocode(&self, coordinates: Coordinates) -> Option<String> {
        let latlng = format!("{},{}", coordinates.lat, coordinates.lng);
        match self.lookup(&[("latlng", latlng)]).await {
            Ok(result) => result.map(|r| r.formatted_address),
            Err(e) => {
                log::warn!("Reverse geocoding {:?} failed: {}", coordinates, e);
                None
            }
        }
    }

    async fn lookup(&self, query: &[(&str, String)]) -> ApiResult<Option<GeocodeResult>> {
        let Some(key) = &self.api_key else {
            return Ok(None);
        };

        let response = self
            .client
            .get(&self.base_url)
            .query(query)
            .query(&[("key", key)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::HttpStatus(response.status()));
        }

        let body: GeocodeResponse = response.json().await?;
        if body.status != "OK" {
            log::warn!(
                "Geocoder returned status {}: {}",
                body.status,
                body.error_message.as_deref().unwrap_or("no details")
            );
            return Ok(None);
        }
        Ok(body.results.into_iter().next())
    }
}

/// Google Maps search link for an address
pub fn maps_search_url(address: &str) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={}",
        urlencoding::encode(address)
    )
}
