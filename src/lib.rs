pub mod api;
pub mod config;
pub mod error;
pub mod location;
pub mod models;
pub mod photo_cache;
pub mod place_list;

// Re-export commonly used items
pub use api::{BeanScoreApi, FileTokenStore, MemoryTokenStore, PhotoUpload, PlaceService, TokenStore};
pub use config::{AppConfig, DebugFlags};
pub use error::{ApiError, ApiResult, ValidationError};
pub use location::{address_from_current_location, maps_search_url, FixedLocation, Geocoder, Locator};
pub use models::{calculate_score, Coordinates, FilterSpec, PhotoVariant, Place, PlaceDraft, Position, User};
pub use photo_cache::{CacheStats, PhotoCache, PhotoHandle};
pub use place_list::{calculate_distance, derive_visible_list, format_distance, ListEntry, PlaceList};
