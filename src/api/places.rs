//! Coffee place CRUD.

use log::{debug, info};
use reqwest::StatusCode;

use crate::error::ApiResult;
use crate::models::{Place, PlaceDraft};

use super::{check_status, BeanScoreApi};

impl BeanScoreApi {
    /// All places owned by the logged-in user, in server order.
    pub async fn list_places(&self) -> ApiResult<Vec<Place>> {
        let bearer = self.bearer()?;
        debug!("Fetching places");

        let response = self
            .client
            .get(self.url("coffee-places"))
            .header("Authorization", bearer)
            .send()
            .await?;

        let places: Vec<Place> = check_status(response, "List places").await?.json().await?;
        info!("Loaded {} places", places.len());
        Ok(places)
    }

    /// A single place, or None if it does not exist.
    pub async fn get_place(&self, id: &str) -> ApiResult<Option<Place>> {
        let bearer = self.bearer()?;
        debug!("Fetching place {id}");

        let response = self
            .client
            .get(self.url(&format!("coffee-places/{id}")))
            .header("Authorization", bearer)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("Place {id} not found");
            return Ok(None);
        }

        Ok(Some(check_status(response, "Get place").await?.json().await?))
    }

    /// Validates and creates a place.
    pub async fn create_place(&self, draft: &PlaceDraft) -> ApiResult<Place> {
        draft.validate()?;
        let bearer = self.bearer()?;
        info!("Creating place {}", draft.name);

        let response = self
            .client
            .post(self.url("coffee-places"))
            .header("Authorization", bearer)
            .json(draft)
            .send()
            .await?;

        let place: Place = check_status(response, "Create place").await?.json().await?;
        info!("Created place {} ({})", place.name, place.id);
        Ok(place)
    }

    /// Validates and replaces the editable fields of a place.
    pub async fn update_place(&self, id: &str, draft: &PlaceDraft) -> ApiResult<Place> {
        draft.validate()?;
        let bearer = self.bearer()?;
        info!("Updating place {id}");

        let response = self
            .client
            .put(self.url(&format!("coffee-places/{id}")))
            .header("Authorization", bearer)
            .json(draft)
            .send()
            .await?;

        Ok(check_status(response, "Update place").await?.json().await?)
    }

    pub async fn delete_place(&self, id: &str) -> ApiResult<()> {
        let bearer = self.bearer()?;
        info!("Deleting place {id}");

        let response = self
            .client
            .delete(self.url(&format!("coffee-places/{id}")))
            .header("Authorization", bearer)
            .send()
            .await?;

        check_status(response, "Delete place").await?;
        Ok(())
    }
}
