//! Backend-agnostic `Database` trait for profiles and the ingredient catalog.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::ingredients::{Ingredient, IngredientPatch, NewIngredient};
use crate::profile::{ProfileRequest, UserProfile};

#[async_trait]
pub trait Database: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    // ── Profiles ────────────────────────────────────────────────────

    /// Insert or replace the profile for `profile.user_id`, keeping the
    /// first `created_at`. Returns the stored document.
    async fn upsert_profile(&self, profile: &ProfileRequest) -> Result<UserProfile, DatabaseError>;

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, DatabaseError>;

    // ── Ingredients ─────────────────────────────────────────────────

    /// Every ingredient, ordered by name.
    async fn list_ingredients(&self) -> Result<Vec<Ingredient>, DatabaseError>;

    async fn get_ingredient(&self, id: Uuid) -> Result<Option<Ingredient>, DatabaseError>;

    /// Fails with `DatabaseError::Constraint` on a duplicate name.
    async fn create_ingredient(&self, ingredient: &NewIngredient) -> Result<Ingredient, DatabaseError>;

    /// Apply the fields present in `patch`, keeping the rest. `None` if the
    /// ingredient doesn't exist.
    async fn update_ingredient(
        &self,
        id: Uuid,
        patch: &IngredientPatch,
    ) -> Result<Option<Ingredient>, DatabaseError>;

    /// Returns whether a row was deleted.
    async fn delete_ingredient(&self, id: Uuid) -> Result<bool, DatabaseError>;

    /// Returns the number of rows deleted.
    async fn delete_all_ingredients(&self) -> Result<usize, DatabaseError>;

    async fn count_ingredients(&self) -> Result<usize, DatabaseError>;

    /// Text search over name and category, best match first.
    async fn search_ingredients(&self, query: &str) -> Result<Vec<Ingredient>, DatabaseError>;
}
