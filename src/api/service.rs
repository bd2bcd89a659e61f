//! Place operations that keep the photo cache and coordinates in step with
//! the server.

use std::sync::Arc;

use log::{debug, info};

use crate::error::ApiResult;
use crate::location::Geocoder;
use crate::models::{Place, PlaceDraft};
use crate::photo_cache::PhotoCache;

use super::{BeanScoreApi, PhotoUpload};

/// API client plus the shared photo cache it must invalidate
pub struct PlaceService {
    api: Arc<BeanScoreApi>,
    photos: Arc<PhotoCache>,
    geocoder: Arc<Geocoder>,
}

impl PlaceService {
    pub fn new(api: Arc<BeanScoreApi>, photos: Arc<PhotoCache>, geocoder: Arc<Geocoder>) -> Self {
        Self {
            api,
            photos,
            geocoder,
        }
    }

    pub fn api(&self) -> &BeanScoreApi {
        &self.api
    }

    pub fn photos(&self) -> &PhotoCache {
        &self.photos
    }

    /// Creates a place (`id` None) or updates one, then uploads the photo.
    ///
    /// When online and the draft has no coordinates, the address is geocoded
    /// first; a failed lookup saves the place without coordinates.
    pub async fn save_place(
        &self,
        id: Option<&str>,
        mut draft: PlaceDraft,
        photo: Option<PhotoUpload>,
        online: bool,
    ) -> ApiResult<Place> {
        draft.validate()?;
        if let Some(upload) = &photo {
            upload.validate()?;
        }

        if online && draft.coordinates().is_none() {
            debug!("Geocoding address {:?}", draft.address);
            match self.geocoder.geocode(&draft.address).await {
                Some(coordinates) => draft.set_coordinates(Some(coordinates)),
                None => info!("Geocoding failed, saving without coordinates"),
            }
        }

        let mut place = match id {
            Some(id) => self.api.update_place(id, &draft).await?,
            None => self.api.create_place(&draft).await?,
        };

        if let Some(upload) = photo {
            self.api.upload_photo(&place.id, upload).await?;
            self.photos.invalidate(&place.id);
            place.has_photo = Some(true);
        }

        Ok(place)
    }

    pub async fn delete_place(&self, id: &str) -> ApiResult<()> {
        self.api.delete_place(id).await?;
        self.photos.invalidate(id);
        Ok(())
    }

    pub async fn upload_photo(&self, id: &str, upload: PhotoUpload) -> ApiResult<()> {
        self.api.upload_photo(id, upload).await?;
        self.photos.invalidate(id);
        Ok(())
    }

    pub async fn delete_photo(&self, id: &str) -> ApiResult<()> {
        self.api.delete_photo(id).await?;
        self.photos.invalidate(id);
        Ok(())
    }
}
