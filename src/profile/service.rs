//! The persistence contract the onboarding flow submits to.

use async_trait::async_trait;

use super::model::{ProfileRequest, UserProfile};
use crate::error::ApiError;

/// Upserts a finished profile.
#[async_trait]
pub trait ProfileService: Send + Sync {
    async fn submit(&self, profile: &ProfileRequest) -> Result<UserProfile, ApiError>;
}
