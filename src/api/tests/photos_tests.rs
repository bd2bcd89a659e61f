use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::super::{PhotoUpload, MAX_PHOTO_BYTES, MAX_THUMBNAIL_BYTES};
use super::api_with_mock;
use crate::error::{ApiError, ValidationError};
use crate::models::PhotoVariant;

fn upload() -> PhotoUpload {
    PhotoUpload {
        photo: vec![0xFF; 1024],
        thumbnail: vec![0xFF; 128],
        content_type: "image/jpeg".to_string(),
    }
}

#[test]
fn content_type_from_extension() {
    assert_eq!(PhotoUpload::content_type_for("JPG"), Some("image/jpeg"));
    assert_eq!(PhotoUpload::content_type_for("jpeg"), Some("image/jpeg"));
    assert_eq!(PhotoUpload::content_type_for("png"), Some("image/png"));
    assert_eq!(PhotoUpload::content_type_for("gif"), None);
}

#[test]
fn upload_limits() {
    assert!(upload().validate().is_ok());

    let mut gif = upload();
    gif.content_type = "image/gif".to_string();
    assert_eq!(
        gif.validate(),
        Err(ValidationError::UnsupportedImageType("image/gif".to_string()))
    );

    let mut big = upload();
    big.photo = vec![0; MAX_PHOTO_BYTES + 1];
    assert_eq!(
        big.validate(),
        Err(ValidationError::PhotoTooLarge(MAX_PHOTO_BYTES + 1))
    );

    let mut big_thumb = upload();
    big_thumb.thumbnail = vec![0; MAX_THUMBNAIL_BYTES + 1];
    assert_eq!(
        big_thumb.validate(),
        Err(ValidationError::ThumbnailTooLarge(MAX_THUMBNAIL_BYTES + 1))
    );

    let mut exact = upload();
    exact.photo = vec![0; MAX_PHOTO_BYTES];
    exact.thumbnail = vec![0; MAX_THUMBNAIL_BYTES];
    assert!(exact.validate().is_ok());
}

#[tokio::test]
async fn upload_sends_multipart_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/coffee-places/p1/photo"))
        .and(header("Authorization", "Bearer test_token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    api_with_mock(&server.uri())
        .upload_photo("p1", upload())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let content_type = requests[0]
        .headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.starts_with("multipart/form-data"));

    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"photo\""));
    assert!(body.contains("name=\"thumbnail\""));
    assert!(body.contains("name=\"contentType\""));
    assert!(body.contains("image/jpeg"));
}

#[tokio::test]
async fn oversized_upload_is_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut big = upload();
    big.thumbnail = vec![0; MAX_THUMBNAIL_BYTES + 1];
    let err = api_with_mock(&server.uri())
        .upload_photo("p1", big)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Validation(ValidationError::ThumbnailTooLarge(_))
    ));
}

#[tokio::test]
async fn fetch_returns_bytes_and_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coffee-places/p1/photo/thumbnail"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "image/png")
                .set_body_bytes(vec![1, 2, 3]),
        )
        .mount(&server)
        .await;

    let photo = api_with_mock(&server.uri())
        .fetch_photo("p1", PhotoVariant::Thumbnail)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(photo.bytes, vec![1, 2, 3]);
    assert_eq!(photo.content_type, "image/png");
}

#[tokio::test]
async fn fetch_missing_photo_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coffee-places/p1/photo"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let photo = api_with_mock(&server.uri())
        .fetch_photo("p1", PhotoVariant::Full)
        .await
        .unwrap();
    assert!(photo.is_none());
}

#[tokio::test]
async fn delete_photo_uses_photo_url() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/coffee-places/p1/photo"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    api_with_mock(&server.uri()).delete_photo("p1").await.unwrap();
}
