//! libSQL backend: async `Database` trait implementation.
//!
//! Nested documents (goals, preferences, nutrition, string lists) are
//! stored as JSON text columns. Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::ingredients::catalog;
use crate::ingredients::{Ingredient, IngredientPatch, NewIngredient};
use crate::profile::{ProfileRequest, UserProfile};
use crate::store::migrations;
use crate::store::traits::Database;

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests and throwaway servers).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        Ok(backend)
    }

    /// Open the database named by a connection string. `:memory:` gives a
    /// fresh in-memory database; anything else is a local file path.
    pub async fn open(url: &str) -> Result<Self, DatabaseError> {
        match url {
            ":memory:" => Self::new_memory().await,
            path => Self::new_local(Path::new(path.strip_prefix("file:").unwrap_or(path))).await,
        }
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

fn to_json<T: Serialize>(value: &T, op: &str) -> Result<String, DatabaseError> {
    serde_json::to_string(value)
        .map_err(|e| DatabaseError::Serialization(format!("{op}: {e}")))
}

fn from_json<T: DeserializeOwned>(raw: &str, op: &str) -> Result<T, DatabaseError> {
    serde_json::from_str(raw).map_err(|e| DatabaseError::Serialization(format!("{op}: {e}")))
}

/// Classify a write error: unique-key violations become `Constraint`.
fn write_error(op: &str, e: libsql::Error) -> DatabaseError {
    let message = e.to_string();
    if message.contains("UNIQUE constraint failed") {
        DatabaseError::Constraint(format!("{op}: {message}"))
    } else {
        DatabaseError::Query(format!("{op}: {message}"))
    }
}

/// Convert `Option<&str>` to libsql Value.
fn opt_text(s: Option<&str>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s.to_string()),
        None => libsql::Value::Null,
    }
}

/// Map a libsql Row to a UserProfile.
///
/// Column order matches PROFILE_COLUMNS:
/// 0:user_id, 1:email, 2:display_name, 3:dietary_goals, 4:preferences,
/// 5:created_at, 6:updated_at
fn row_to_profile(row: &libsql::Row) -> Result<UserProfile, DatabaseError> {
    let read = |e: libsql::Error| DatabaseError::Query(format!("profile row parse: {e}"));
    let goals: String = row.get(3).map_err(read)?;
    let preferences: String = row.get(4).map_err(read)?;
    let created: String = row.get(5).map_err(read)?;
    let updated: String = row.get(6).map_err(read)?;

    Ok(UserProfile {
        user_id: row.get(0).map_err(read)?,
        email: row.get(1).map_err(read)?,
        display_name: row.get::<String>(2).ok(),
        dietary_goals: from_json(&goals, "profile dietary_goals")?,
        preferences: from_json(&preferences, "profile preferences")?,
        created_at: parse_datetime(&created),
        updated_at: parse_datetime(&updated),
    })
}

/// Map a libsql Row to an Ingredient.
///
/// Column order matches INGREDIENT_COLUMNS:
/// 0:id, 1:name, 2:category, 3:nutritional_info, 4:seasonality,
/// 5:common_allergies, 6:dietary_categories, 7:substitutes,
/// 8:created_at, 9:updated_at
fn row_to_ingredient(row: &libsql::Row) -> Result<Ingredient, DatabaseError> {
    let read = |e: libsql::Error| DatabaseError::Query(format!("ingredient row parse: {e}"));
    let json_col = |idx: i32, name: &str| -> Result<Vec<String>, DatabaseError> {
        let raw: String = row.get(idx).map_err(read)?;
        from_json(&raw, name)
    };

    let id: String = row.get(0).map_err(read)?;
    let nutrition: String = row.get(3).map_err(read)?;
    let created: String = row.get(8).map_err(read)?;
    let updated: String = row.get(9).map_err(read)?;

    Ok(Ingredient {
        id: Uuid::parse_str(&id)
            .map_err(|e| DatabaseError::Serialization(format!("ingredient id {id}: {e}")))?,
        name: row.get(1).map_err(read)?,
        category: json_col(2, "ingredient category")?,
        nutritional_info: from_json(&nutrition, "ingredient nutritional_info")?,
        seasonality: json_col(4, "ingredient seasonality")?,
        common_allergies: json_col(5, "ingredient common_allergies")?,
        dietary_categories: json_col(6, "ingredient dietary_categories")?,
        substitutes: json_col(7, "ingredient substitutes")?,
        created_at: parse_datetime(&created),
        updated_at: parse_datetime(&updated),
    })
}

/// JSON-encoded column values for an ingredient write, in column order
/// `category, nutritional_info, seasonality, common_allergies,
/// dietary_categories, substitutes`.
fn ingredient_json_columns(ingredient: &NewIngredient, op: &str) -> Result<[String; 6], DatabaseError> {
    Ok([
        to_json(&ingredient.category, op)?,
        to_json(&ingredient.nutritional_info, op)?,
        to_json(&ingredient.seasonality, op)?,
        to_json(&ingredient.common_allergies, op)?,
        to_json(&ingredient.dietary_categories, op)?,
        to_json(&ingredient.substitutes, op)?,
    ])
}

// ── Trait implementation ────────────────────────────────────────────

const PROFILE_COLUMNS: &str =
    "user_id, email, display_name, dietary_goals, preferences, created_at, updated_at";

const INGREDIENT_COLUMNS: &str = "id, name, category, nutritional_info, seasonality, common_allergies, dietary_categories, substitutes, created_at, updated_at";

#[async_trait]
impl Database for LibSqlBackend {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    // ── Profiles ────────────────────────────────────────────────────

    async fn upsert_profile(&self, profile: &ProfileRequest) -> Result<UserProfile, DatabaseError> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();
        let goals = to_json(&profile.dietary_goals, "upsert_profile")?;
        let preferences = to_json(&profile.preferences, "upsert_profile")?;

        conn.execute(
            "INSERT INTO user_profiles (user_id, email, display_name, dietary_goals, preferences, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             ON CONFLICT(user_id) DO UPDATE SET
                email = excluded.email,
                display_name = excluded.display_name,
                dietary_goals = excluded.dietary_goals,
                preferences = excluded.preferences,
                updated_at = excluded.updated_at",
            params![
                profile.user_id.as_str(),
                profile.email.as_str(),
                opt_text(profile.display_name.as_deref()),
                goals,
                preferences,
                now,
            ],
        )
        .await
        .map_err(|e| write_error("upsert_profile", e))?;

        debug!(user_id = %profile.user_id, "Profile saved");

        self.get_profile(&profile.user_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound {
                entity: "profile".to_string(),
                id: profile.user_id.clone(),
            })
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!("SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE user_id = ?1"),
                params![user_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_profile: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_profile(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_profile: {e}"))),
        }
    }

    // ── Ingredients ─────────────────────────────────────────────────

    async fn list_ingredients(&self) -> Result<Vec<Ingredient>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!("SELECT {INGREDIENT_COLUMNS} FROM ingredients ORDER BY name ASC"),
                (),
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_ingredients: {e}")))?;

        let mut ingredients = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("list_ingredients: {e}")))?
        {
            ingredients.push(row_to_ingredient(&row)?);
        }
        Ok(ingredients)
    }

    async fn get_ingredient(&self, id: Uuid) -> Result<Option<Ingredient>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!("SELECT {INGREDIENT_COLUMNS} FROM ingredients WHERE id = ?1"),
                params![id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_ingredient: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_ingredient(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_ingredient: {e}"))),
        }
    }

    async fn create_ingredient(&self, ingredient: &NewIngredient) -> Result<Ingredient, DatabaseError> {
        let conn = self.conn();
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();
        let [category, nutrition, seasonality, allergies, dietary, substitutes] =
            ingredient_json_columns(ingredient, "create_ingredient")?;

        conn.execute(
            &format!(
                "INSERT INTO ingredients ({INGREDIENT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)"
            ),
            params![
                id.to_string(),
                ingredient.name.trim(),
                category,
                nutrition,
                seasonality,
                allergies,
                dietary,
                substitutes,
                now,
            ],
        )
        .await
        .map_err(|e| write_error("create_ingredient", e))?;

        debug!(ingredient_id = %id, name = %ingredient.name, "Ingredient created");

        self.get_ingredient(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound {
                entity: "ingredient".to_string(),
                id: id.to_string(),
            })
    }

    async fn update_ingredient(
        &self,
        id: Uuid,
        patch: &IngredientPatch,
    ) -> Result<Option<Ingredient>, DatabaseError> {
        let Some(current) = self.get_ingredient(id).await? else {
            return Ok(None);
        };
        let ingredient = patch.merge_into(&current);

        let conn = self.conn();
        let now = Utc::now().to_rfc3339();
        let [category, nutrition, seasonality, allergies, dietary, substitutes] =
            ingredient_json_columns(&ingredient, "update_ingredient")?;

        let count = conn
            .execute(
                "UPDATE ingredients SET name = ?1, category = ?2, nutritional_info = ?3,
                    seasonality = ?4, common_allergies = ?5, dietary_categories = ?6,
                    substitutes = ?7, updated_at = ?8
                 WHERE id = ?9",
                params![
                    ingredient.name.trim(),
                    category,
                    nutrition,
                    seasonality,
                    allergies,
                    dietary,
                    substitutes,
                    now,
                    id.to_string(),
                ],
            )
            .await
            .map_err(|e| write_error("update_ingredient", e))?;

        if count == 0 {
            return Ok(None);
        }
        debug!(ingredient_id = %id, "Ingredient updated");
        self.get_ingredient(id).await
    }

    async fn delete_ingredient(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let conn = self.conn();
        let count = conn
            .execute(
                "DELETE FROM ingredients WHERE id = ?1",
                params![id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("delete_ingredient: {e}")))?;
        Ok(count > 0)
    }

    async fn delete_all_ingredients(&self) -> Result<usize, DatabaseError> {
        let conn = self.conn();
        let count = conn
            .execute("DELETE FROM ingredients", ())
            .await
            .map_err(|e| DatabaseError::Query(format!("delete_all_ingredients: {e}")))?;
        Ok(count as usize)
    }

    async fn count_ingredients(&self) -> Result<usize, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query("SELECT COUNT(*) FROM ingredients", ())
            .await
            .map_err(|e| DatabaseError::Query(format!("count_ingredients: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let count: i64 = row
                    .get(0)
                    .map_err(|e| DatabaseError::Query(format!("count_ingredients: {e}")))?;
                Ok(count as usize)
            }
            Ok(None) => Ok(0),
            Err(e) => Err(DatabaseError::Query(format!("count_ingredients: {e}"))),
        }
    }

    async fn search_ingredients(&self, query: &str) -> Result<Vec<Ingredient>, DatabaseError> {
        let all = self.list_ingredients().await?;
        Ok(catalog::rank(all, query))
    }
}
