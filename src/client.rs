//! HTTP client for the meals backend.
//!
//! Implements the profile submission and ingredient lookup contracts the
//! onboarding flow depends on.

use async_trait::async_trait;
use reqwest::Response;
use serde::Deserialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::ingredients::{Ingredient, IngredientLookup, IngredientRef};
use crate::profile::{ProfileRequest, ProfileService, UserProfile};

/// `{ "error": "..." }` body the backend sends with non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct ApiClient {
    config: ClientConfig,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch a stored profile. `None` on 404.
    pub async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, ApiError> {
        let resp = self
            .client
            .get(self.config.build_url(&format!("/api/profile/{user_id}")))
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = check_status(resp, "Failed to fetch profile").await?;
        Ok(Some(resp.json().await?))
    }

    /// Server-side ranked search over the catalog.
    pub async fn search_ingredients(&self, query: &str) -> Result<Vec<Ingredient>, ApiError> {
        let resp = self
            .client
            .get(self.config.build_url("/api/ingredients/search"))
            .query(&[("query", query)])
            .send()
            .await?;

        let resp = check_status(resp, "Failed to search ingredients").await?;
        Ok(resp.json().await?)
    }
}

/// Pass 2xx responses through; turn anything else into `ApiError::Server`
/// carrying the body's `error` field, or `fallback` when there isn't one.
async fn check_status(resp: Response, fallback: &str) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or_else(|_| fallback.to_string());
    debug!(status = status.as_u16(), message = %message, "Backend request failed");
    Err(ApiError::Server {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl ProfileService for ApiClient {
    async fn submit(&self, profile: &ProfileRequest) -> Result<UserProfile, ApiError> {
        let resp = self
            .client
            .post(self.config.build_url("/api/profile"))
            .json(profile)
            .send()
            .await?;

        let resp = check_status(resp, "Failed to save profile").await?;
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl IngredientLookup for ApiClient {
    async fn fetch_all(&self) -> Result<Vec<IngredientRef>, ApiError> {
        let resp = self
            .client
            .get(self.config.build_url("/api/ingredients"))
            .send()
            .await?;

        let resp = check_status(resp, "Failed to fetch ingredients").await?;
        Ok(resp.json().await?)
    }
}
