//! Login, registration and account management.

use log::{debug, info, warn};
use serde_json::json;

use crate::error::ApiResult;
use crate::models::{AuthResponse, User};

use super::{check_status, BeanScoreApi};

impl BeanScoreApi {
    /// Logs in and stores the returned token.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<User> {
        info!("Logging in as {email}");
        let response = self
            .client
            .post(self.url("auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let auth: AuthResponse = check_status(response, "Login").await?.json().await?;
        self.tokens.set(&auth.token)?;
        info!("Logged in as {} ({})", auth.user.name, auth.user.id);
        Ok(auth.user)
    }

    /// Creates an account and stores the returned token.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> ApiResult<User> {
        info!("Registering account for {email}");
        let response = self
            .client
            .post(self.url("auth/register"))
            .json(&json!({ "email": email, "password": password, "name": name }))
            .send()
            .await?;

        let auth: AuthResponse = check_status(response, "Register").await?.json().await?;
        self.tokens.set(&auth.token)?;
        info!("Registered {} ({})", auth.user.name, auth.user.id);
        Ok(auth.user)
    }

    /// Returns the logged-in user, or None when no valid token is stored.
    pub async fn current_user(&self) -> ApiResult<Option<User>> {
        let Ok(bearer) = self.bearer() else {
            debug!("No token stored, not authenticated");
            return Ok(None);
        };

        let response = self
            .client
            .get(self.url("auth/me"))
            .header("Authorization", bearer)
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("Token rejected with status {}", response.status());
            return Ok(None);
        }

        Ok(Some(response.json().await?))
    }

    /// Forgets the stored token.
    pub fn logout(&self) -> ApiResult<()> {
        info!("Logging out");
        self.tokens.clear()
    }

    /// Deletes the account on the server, then forgets the token.
    pub async fn delete_account(&self) -> ApiResult<()> {
        let bearer = self.bearer()?;
        info!("Deleting account");

        let response = self
            .client
            .delete(self.url("user"))
            .header("Authorization", bearer)
            .send()
            .await?;

        check_status(response, "Delete account").await?;
        self.tokens.clear()
    }
}
