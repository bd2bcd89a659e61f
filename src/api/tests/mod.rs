//! Unit tests for the API module.

mod construction_tests;
mod photos_tests;
mod places_tests;

use std::sync::Arc;

use super::{BeanScoreApi, MemoryTokenStore, TokenStore};

/// Client against a mock server, logged in with "test_token"
pub(super) fn api_with_mock(mock_uri: &str) -> BeanScoreApi {
    let tokens: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::with_token("test_token"));
    BeanScoreApi::new(mock_uri, tokens)
}

/// Client against a mock server with no stored token
pub(super) fn anonymous_api(mock_uri: &str) -> BeanScoreApi {
    BeanScoreApi::new(mock_uri, Arc::new(MemoryTokenStore::new()))
}

pub(super) fn place_json(id: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "userId": "u1",
        "name": name,
        "address": "1 Main St",
        "instagramHandle": null,
        "coffeeQuality": 4,
        "ambient": 3,
        "hasGlutenFree": false,
        "hasVegMilk": true,
        "hasVeganFood": false,
        "hasSugarFree": false,
        "latitude": 40.0,
        "longitude": -74.0,
        "hasPhoto": false,
        "createdAt": "2025-01-15T12:00:00Z",
        "updatedAt": "2025-01-15T12:00:00Z"
    })
}
