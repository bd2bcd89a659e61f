use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Highest star rating a place can receive
pub const MAX_RATING: u8 = 5;

/// A tracked coffee place as returned by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub instagram_handle: Option<String>,
    pub coffee_quality: u8,
    pub ambient: u8,
    #[serde(default)]
    pub has_gluten_free: bool,
    #[serde(default)]
    pub has_veg_milk: bool,
    #[serde(default)]
    pub has_vegan_food: bool,
    #[serde(default)]
    pub has_sugar_free: bool,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub has_photo: Option<bool>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Place {
    /// Mean of the two ratings
    pub fn score(&self) -> f64 {
        calculate_score(self.coffee_quality, self.ambient)
    }

    /// Both coordinates, or None until the address has been geocoded
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        }
    }

    /// Whether the server reported a stored photo
    pub fn has_photo(&self) -> bool {
        self.has_photo.unwrap_or(false)
    }
}

/// Score shown on a place card: arithmetic mean of both ratings
pub fn calculate_score(coffee_quality: u8, ambient: u8) -> f64 {
    (f64::from(coffee_quality) + f64::from(ambient)) / 2.0
}

/// Latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A position fix from a location provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub coordinates: Coordinates,
    /// Accuracy radius in meters, when the provider reports one
    pub accuracy_m: Option<f64>,
}

/// Editable place fields, as held by the add/edit form.
///
/// A rating of 0 means the user has not picked any stars yet; such a draft
/// never passes [`PlaceDraft::validate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDraft {
    pub name: String,
    pub address: String,
    pub instagram_handle: Option<String>,
    pub coffee_quality: u8,
    pub ambient: u8,
    pub has_gluten_free: bool,
    pub has_veg_milk: bool,
    pub has_vegan_food: bool,
    pub has_sugar_free: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl PlaceDraft {
    /// Check the draft before it is submitted
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        if self.address.trim().is_empty() {
            return Err(ValidationError::MissingAddress);
        }
        if self.coffee_quality == 0 || self.ambient == 0 {
            return Err(ValidationError::MissingRating);
        }
        if self.coffee_quality > MAX_RATING || self.ambient > MAX_RATING {
            return Err(ValidationError::RatingOutOfRange);
        }
        Ok(())
    }

    pub fn set_coordinates(&mut self, coordinates: Option<Coordinates>) {
        self.latitude = coordinates.map(|c| c.lat);
        self.longitude = coordinates.map(|c| c.lng);
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        }
    }
}

impl From<&Place> for PlaceDraft {
    fn from(place: &Place) -> Self {
        Self {
            name: place.name.clone(),
            address: place.address.clone(),
            instagram_handle: place.instagram_handle.clone(),
            coffee_quality: place.coffee_quality,
            ambient: place.ambient,
            has_gluten_free: place.has_gluten_free,
            has_veg_milk: place.has_veg_milk,
            has_vegan_food: place.has_vegan_food,
            has_sugar_free: place.has_sugar_free,
            latitude: place.latitude,
            longitude: place.longitude,
        }
    }
}

/// Active search and dietary filters on the home list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub search_term: String,
    pub has_gluten_free: bool,
    pub has_veg_milk: bool,
    pub has_vegan_food: bool,
    pub has_sugar_free: bool,
}

impl FilterSpec {
    /// Whether any criterion is set; used to tell "no places yet" from
    /// "no places match your filters"
    pub fn is_active(&self) -> bool {
        !self.search_term.is_empty()
            || self.has_gluten_free
            || self.has_veg_milk
            || self.has_vegan_food
            || self.has_sugar_free
    }
}

/// Image size class served by the photo endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhotoVariant {
    Thumbnail,
    Full,
}

impl PhotoVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoVariant::Thumbnail => "thumbnail",
            PhotoVariant::Full => "full",
        }
    }

    /// Path of this variant below `/coffee-places/{id}`
    pub fn endpoint_suffix(&self) -> &'static str {
        match self {
            PhotoVariant::Thumbnail => "photo/thumbnail",
            PhotoVariant::Full => "photo",
        }
    }

    /// Parse "thumbnail" or "full" (also accepts "photo" for the full image)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "thumbnail" | "thumb" => Some(PhotoVariant::Thumbnail),
            "full" | "photo" => Some(PhotoVariant::Full),
            _ => None,
        }
    }

    pub fn all() -> &'static [PhotoVariant] {
        &[PhotoVariant::Thumbnail, PhotoVariant::Full]
    }
}

impl std::fmt::Display for PhotoVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account data returned by the auth endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// Login/register response
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;
