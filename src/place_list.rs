//! Home list derivation: filtering, distances and distance sorting

use crate::config::DebugFlags;
use crate::models::{Coordinates, FilterSpec, Place};

/// Mean Earth radius used by the haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers between two points given in degrees
pub fn calculate_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Render a distance for a place card: "450m" below one kilometer, "3.2km" above
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{}m", (km * 1000.0).round() as i64)
    } else {
        format!("{km:.1}km")
    }
}

/// Distance from `location` to the place, None if the place is not geocoded
pub fn distance_to(place: &Place, location: Coordinates) -> Option<f64> {
    place
        .coordinates()
        .map(|c| calculate_distance(location.lat, location.lng, c.lat, c.lng))
}

/// Returns true if the place passes the search term and every set dietary flag
pub fn matches_filter(place: &Place, filter: &FilterSpec) -> bool {
    if !filter.search_term.is_empty() {
        let term = filter.search_term.to_lowercase();
        if !place.name.to_lowercase().contains(&term)
            && !place.address.to_lowercase().contains(&term)
        {
            return false;
        }
    }

    (!filter.has_gluten_free || place.has_gluten_free)
        && (!filter.has_veg_milk || place.has_veg_milk)
        && (!filter.has_vegan_food || place.has_vegan_food)
        && (!filter.has_sugar_free || place.has_sugar_free)
}

/// One row of the rendered list
#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry<'a> {
    pub place: &'a Place,
    pub score: f64,
    /// Only set when online with a known location and the place is geocoded
    pub distance_km: Option<f64>,
}

impl ListEntry<'_> {
    pub fn formatted_distance(&self) -> Option<String> {
        self.distance_km.map(format_distance)
    }
}

/// Turns the loaded places plus UI state into the list to display
#[derive(Debug, Clone, Default)]
pub struct PlaceList {
    debug_maps: bool,
}

impl PlaceList {
    pub fn new(debug: DebugFlags) -> Self {
        Self {
            debug_maps: debug.maps,
        }
    }

    /// Filter, then sort by distance when `online` and a location is known.
    ///
    /// Without a location, or offline, the filtered places keep input order.
    pub fn derive<'a>(
        &self,
        places: &'a [Place],
        filter: &FilterSpec,
        location: Option<Coordinates>,
        online: bool,
    ) -> Vec<&'a Place> {
        let filtered: Vec<&Place> = places.iter().filter(|p| matches_filter(p, filter)).collect();

        if self.debug_maps {
            log::debug!(
                "Derived list: {} of {} places pass filters (location: {:?}, online: {})",
                filtered.len(),
                places.len(),
                location,
                online
            );
        }

        match location {
            Some(location) if online => self.sort_by_distance(filtered, location),
            _ => {
                if self.debug_maps {
                    log::debug!("Not sorting by distance, keeping natural order");
                }
                filtered
            }
        }
    }

    /// Derived list paired with the score and distance shown on each card
    pub fn entries<'a>(
        &self,
        places: &'a [Place],
        filter: &FilterSpec,
        location: Option<Coordinates>,
        online: bool,
    ) -> Vec<ListEntry<'a>> {
        let distance_origin = location.filter(|_| online);
        self.derive(places, filter, location, online)
            .into_iter()
            .map(|place| ListEntry {
                place,
                score: place.score(),
                distance_km: distance_origin.and_then(|loc| distance_to(place, loc)),
            })
            .collect()
    }

    /// Places without coordinates stay in their slots; the geocoded ones are
    /// stably sorted by distance and written back into the remaining slots.
    fn sort_by_distance<'a>(&self, mut list: Vec<&'a Place>, location: Coordinates) -> Vec<&'a Place> {
        let mut slots = Vec::new();
        let mut located = Vec::new();
        for (slot, place) in list.iter().enumerate() {
            if let Some(km) = distance_to(place, location) {
                if self.debug_maps {
                    log::debug!("Distance to {}: {:.2}km", place.name, km);
                }
                slots.push(slot);
                located.push((*place, km));
            }
        }

        located.sort_by(|a, b| a.1.total_cmp(&b.1));

        for (slot, (place, _)) in slots.into_iter().zip(located) {
            list[slot] = place;
        }
        list
    }
}

/// Convenience wrapper over [`PlaceList::derive`] with debug tracing off
pub fn derive_visible_list<'a>(
    places: &'a [Place],
    filter: &FilterSpec,
    location: Option<Coordinates>,
    online: bool,
) -> Vec<&'a Place> {
    PlaceList::default().derive(places, filter, location, online)
}

#[cfg(test)]
#[path = "place_list_tests.rs"]
mod tests;
