use std::sync::Arc;

use super::super::{BeanScoreApi, MemoryTokenStore, TokenStore};
use super::{anonymous_api, api_with_mock};

#[test]
fn trailing_slash_is_trimmed() {
    let api = anonymous_api("http://localhost:8080/");
    assert_eq!(api.base_url(), "http://localhost:8080");
    assert_eq!(api.url("coffee-places"), "http://localhost:8080/coffee-places");
    assert_eq!(api.url("/auth/me"), "http://localhost:8080/auth/me");
}

#[test]
fn authentication_follows_token_store() {
    let tokens = Arc::new(MemoryTokenStore::new());
    let api = BeanScoreApi::new("http://localhost", tokens.clone());
    assert!(!api.is_authenticated());

    tokens.set("abc").unwrap();
    assert!(api.is_authenticated());
    assert_eq!(api.bearer().unwrap(), "Bearer abc");
}

#[test]
fn bearer_without_token_fails() {
    let api = anonymous_api("http://localhost");
    assert!(matches!(
        api.bearer(),
        Err(crate::error::ApiError::NotAuthenticated)
    ));
}

#[test]
fn mock_client_is_authenticated() {
    assert!(api_with_mock("http://localhost").is_authenticated());
}
