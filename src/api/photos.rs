//! Photo upload, download and deletion.

use log::{debug, info};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;

use crate::error::{ApiResult, ValidationError};
use crate::models::PhotoVariant;

use super::{check_status, BeanScoreApi};

/// Largest full-size photo the server accepts
pub const MAX_PHOTO_BYTES: usize = 2 * 1024 * 1024;
/// Largest thumbnail the server accepts
pub const MAX_THUMBNAIL_BYTES: usize = 500 * 1024;

const ALLOWED_CONTENT_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// Downloaded image payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoBytes {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Both sizes of a photo, already resized by the caller
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub photo: Vec<u8>,
    pub thumbnail: Vec<u8>,
    pub content_type: String,
}

impl PhotoUpload {
    /// Same limits the server enforces, checked before uploading
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !ALLOWED_CONTENT_TYPES.contains(&self.content_type.as_str()) {
            return Err(ValidationError::UnsupportedImageType(
                self.content_type.clone(),
            ));
        }
        if self.photo.len() > MAX_PHOTO_BYTES {
            return Err(ValidationError::PhotoTooLarge(self.photo.len()));
        }
        if self.thumbnail.len() > MAX_THUMBNAIL_BYTES {
            return Err(ValidationError::ThumbnailTooLarge(self.thumbnail.len()));
        }
        Ok(())
    }

    /// Content type from a file extension ("jpg", "jpeg", "png")
    pub fn content_type_for(extension: &str) -> Option<&'static str> {
        match extension.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some("image/jpeg"),
            "png" => Some("image/png"),
            _ => None,
        }
    }

    fn file_name(&self, stem: &str) -> String {
        let ext = if self.content_type == "image/png" {
            "png"
        } else {
            "jpg"
        };
        format!("{stem}.{ext}")
    }
}

impl BeanScoreApi {
    /// Uploads both photo variants, replacing any existing photo.
    pub async fn upload_photo(&self, place_id: &str, upload: PhotoUpload) -> ApiResult<()> {
        upload.validate()?;
        let bearer = self.bearer()?;
        info!(
            "Uploading photo for place {} ({} bytes, thumbnail {} bytes)",
            place_id,
            upload.photo.len(),
            upload.thumbnail.len()
        );

        let photo_name = upload.file_name("photo");
        let thumbnail_name = upload.file_name("thumbnail");
        let form = Form::new()
            .part(
                "photo",
                Part::bytes(upload.photo)
                    .file_name(photo_name)
                    .mime_str("application/octet-stream")?,
            )
            .part(
                "thumbnail",
                Part::bytes(upload.thumbnail)
                    .file_name(thumbnail_name)
                    .mime_str("application/octet-stream")?,
            )
            .text("contentType", upload.content_type);

        let response = self
            .client
            .post(self.url(&format!("coffee-places/{place_id}/photo")))
            .header("Authorization", bearer)
            .multipart(form)
            .send()
            .await?;

        check_status(response, "Upload photo").await?;
        Ok(())
    }

    pub async fn delete_photo(&self, place_id: &str) -> ApiResult<()> {
        let bearer = self.bearer()?;
        info!("Deleting photo for place {place_id}");

        let response = self
            .client
            .delete(self.url(&format!("coffee-places/{place_id}/photo")))
            .header("Authorization", bearer)
            .send()
            .await?;

        check_status(response, "Delete photo").await?;
        Ok(())
    }

    /// Downloads one photo variant. A 404 means the place has no photo.
    pub async fn fetch_photo(
        &self,
        place_id: &str,
        variant: PhotoVariant,
    ) -> ApiResult<Option<PhotoBytes>> {
        let bearer = self.bearer()?;
        let url = self.url(&format!(
            "coffee-places/{place_id}/{}",
            variant.endpoint_suffix()
        ));
        debug!("Fetching photo: {url}");

        let response = self
            .client
            .get(&url)
            .header("Authorization", bearer)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("No {variant} photo for place {place_id}");
            return Ok(None);
        }

        let response = check_status(response, "Fetch photo").await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();
        let bytes = response.bytes().await?.to_vec();

        Ok(Some(PhotoBytes {
            bytes,
            content_type,
        }))
    }
}
