//! Client for the bean score REST backend.
//!
//! Covers authentication, place CRUD and photo storage. Every call except
//! login and register sends the stored bearer token.

mod auth;
mod photos;
mod places;
pub mod service;
pub mod token;

use std::sync::Arc;

use reqwest::{Client, Response};

use crate::error::{ApiError, ApiResult};

pub use photos::{PhotoBytes, PhotoUpload, MAX_PHOTO_BYTES, MAX_THUMBNAIL_BYTES};
pub use service::PlaceService;
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};

/// Bean score API client
pub struct BeanScoreApi {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) tokens: Arc<dyn TokenStore>,
}

impl BeanScoreApi {
    /// Creates a client for the given backend using `tokens` for credentials.
    pub fn new(base_url: &str, tokens: Arc<dyn TokenStore>) -> Self {
        log::info!("Creating bean score API client for {}", base_url);
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether a bearer token is currently stored
    pub fn is_authenticated(&self) -> bool {
        self.tokens.get().is_some()
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn bearer(&self) -> ApiResult<String> {
        self.tokens
            .get()
            .map(|token| format!("Bearer {token}"))
            .ok_or(ApiError::NotAuthenticated)
    }
}

/// Pass successful responses through, turn everything else into an error
/// carrying the response body when there is one.
pub(crate) async fn check_status(response: Response, action: &str) -> ApiResult<Response> {
    let status = response.status();
    log::debug!("{} response status: {}", action, status);
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    log::error!("{} failed with status {}: {}", action, status, message);
    if message.trim().is_empty() {
        Err(ApiError::HttpStatus(status))
    } else {
        Err(ApiError::ApiResponse {
            status,
            message: message.trim().to_string(),
        })
    }
}

#[cfg(test)]
#[path = "tests/mod.rs"]
mod tests;
