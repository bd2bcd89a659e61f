use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{anonymous_api, api_with_mock, place_json};
use crate::error::{ApiError, ValidationError};
use crate::models::PlaceDraft;

fn draft() -> PlaceDraft {
    PlaceDraft {
        name: "Bean There".to_string(),
        address: "1 Main St".to_string(),
        coffee_quality: 4,
        ambient: 3,
        has_veg_milk: true,
        ..Default::default()
    }
}

#[tokio::test]
async fn list_places_keeps_server_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coffee-places"))
        .and(header("Authorization", "Bearer test_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            place_json("b", "Second Cup"),
            place_json("a", "Bean There"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let places = api_with_mock(&server.uri()).list_places().await.unwrap();
    let ids: Vec<_> = places.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["b", "a"]);
    assert_eq!(places[1].score(), 3.5);
}

#[tokio::test]
async fn list_places_requires_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let err = anonymous_api(&server.uri()).list_places().await.unwrap_err();
    assert!(matches!(err, ApiError::NotAuthenticated));
}

#[tokio::test]
async fn get_missing_place_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coffee-places/nope"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let place = api_with_mock(&server.uri()).get_place("nope").await.unwrap();
    assert!(place.is_none());
}

#[tokio::test]
async fn get_place_parses_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coffee-places/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(place_json("p1", "Bean There")))
        .mount(&server)
        .await;

    let place = api_with_mock(&server.uri())
        .get_place("p1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(place.name, "Bean There");
    assert!(place.coordinates().is_some());
}

#[tokio::test]
async fn create_place_posts_camel_case_draft() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/coffee-places"))
        .and(body_partial_json(json!({
            "name": "Bean There",
            "coffeeQuality": 4,
            "hasVegMilk": true
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(place_json("p9", "Bean There")))
        .expect(1)
        .mount(&server)
        .await;

    let place = api_with_mock(&server.uri())
        .create_place(&draft())
        .await
        .unwrap();
    assert_eq!(place.id, "p9");
}

#[tokio::test]
async fn invalid_draft_is_rejected_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let mut unrated = draft();
    unrated.ambient = 0;
    let err = api_with_mock(&server.uri())
        .create_place(&unrated)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Validation(ValidationError::MissingRating)
    ));
}

#[tokio::test]
async fn update_place_puts_to_place_url() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/coffee-places/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(place_json("p1", "Renamed")))
        .expect(1)
        .mount(&server)
        .await;

    let place = api_with_mock(&server.uri())
        .update_place("p1", &draft())
        .await
        .unwrap();
    assert_eq!(place.name, "Renamed");
}

#[tokio::test]
async fn delete_place_reports_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/coffee-places/p1"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Not your place"))
        .mount(&server)
        .await;

    let err = api_with_mock(&server.uri())
        .delete_place("p1")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "403 Forbidden: Not your place");
    assert!(!err.is_retryable());
}
