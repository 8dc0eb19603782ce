//! REST endpoints for the ingredient catalog.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use super::model::{IngredientPatch, NewIngredient};
use crate::error::DatabaseError;
use crate::store::Database;

/// Shared state for ingredient routes.
#[derive(Clone)]
pub struct IngredientRouteState {
    pub db: Arc<dyn Database>,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    query: Option<String>,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn storage_failure(op: &str, e: DatabaseError) -> Response {
    warn!(error = %e, "{op} failed");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, &format!("Failed to {op}"))
}

fn parse_id(raw: &str) -> Result<Uuid, Response> {
    Uuid::parse_str(raw).map_err(|_| error_response(StatusCode::BAD_REQUEST, "Invalid ingredient ID"))
}

/// Unwrap a JSON ingredient body and run its validator.
fn parse_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    validate: impl FnOnce(&T) -> Result<(), String>,
) -> Result<T, Response> {
    let Json(body) = payload.map_err(|rejection| {
        error_response(StatusCode::BAD_REQUEST, &rejection.body_text())
    })?;
    validate(&body).map_err(|message| error_response(StatusCode::BAD_REQUEST, &message))?;
    Ok(body)
}

/// Map a failed write to a response: duplicate names are the caller's fault.
fn write_failure(op: &str, e: DatabaseError) -> Response {
    match e {
        DatabaseError::Constraint(_) => error_response(
            StatusCode::BAD_REQUEST,
            "An ingredient with that name already exists",
        ),
        other => storage_failure(op, other),
    }
}

/// GET /api/ingredients
async fn list_ingredients(State(state): State<IngredientRouteState>) -> Response {
    match state.db.list_ingredients().await {
        Ok(ingredients) => Json(ingredients).into_response(),
        Err(e) => storage_failure("fetch ingredients", e),
    }
}

/// GET /api/ingredients/search?query=
async fn search_ingredients(
    State(state): State<IngredientRouteState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let query = params.query.unwrap_or_default();
    if query.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Search query is required");
    }
    match state.db.search_ingredients(&query).await {
        Ok(results) => Json(results).into_response(),
        Err(e) => storage_failure("search ingredients", e),
    }
}

/// GET /api/ingredients/{id}
async fn get_ingredient(
    State(state): State<IngredientRouteState>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state.db.get_ingredient(id).await {
        Ok(Some(ingredient)) => Json(ingredient).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Ingredient not found"),
        Err(e) => storage_failure("fetch ingredient", e),
    }
}

/// POST /api/ingredients
async fn create_ingredient(
    State(state): State<IngredientRouteState>,
    payload: Result<Json<NewIngredient>, JsonRejection>,
) -> Response {
    let body = match parse_body(payload, NewIngredient::validate) {
        Ok(body) => body,
        Err(resp) => return resp,
    };
    match state.db.create_ingredient(&body).await {
        Ok(ingredient) => {
            info!(ingredient_id = %ingredient.id, name = %ingredient.name, "Ingredient created");
            (StatusCode::CREATED, Json(ingredient)).into_response()
        }
        Err(e) => write_failure("create ingredient", e),
    }
}

/// PUT /api/ingredients/{id}
async fn update_ingredient(
    State(state): State<IngredientRouteState>,
    Path(id): Path<String>,
    payload: Result<Json<IngredientPatch>, JsonRejection>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let patch = match parse_body(payload, IngredientPatch::validate) {
        Ok(patch) => patch,
        Err(resp) => return resp,
    };
    match state.db.update_ingredient(id, &patch).await {
        Ok(Some(ingredient)) => Json(ingredient).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Ingredient not found"),
        Err(e) => write_failure("update ingredient", e),
    }
}

/// DELETE /api/ingredients/{id}
async fn delete_ingredient(
    State(state): State<IngredientRouteState>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state.db.delete_ingredient(id).await {
        Ok(true) => {
            info!(ingredient_id = %id, "Ingredient deleted");
            Json(json!({ "message": "Ingredient deleted successfully" })).into_response()
        }
        Ok(false) => error_response(StatusCode::NOT_FOUND, "Ingredient not found"),
        Err(e) => storage_failure("delete ingredient", e),
    }
}

/// Build the ingredient REST routes.
///
/// `/search` is registered as a static segment, so it takes precedence over
/// the `{id}` capture.
pub fn ingredient_routes(db: Arc<dyn Database>) -> Router {
    Router::new()
        .route(
            "/api/ingredients",
            get(list_ingredients).post(create_ingredient),
        )
        .route("/api/ingredients/search", get(search_ingredients))
        .route(
            "/api/ingredients/{id}",
            get(get_ingredient)
                .put(update_ingredient)
                .delete(delete_ingredient),
        )
        .with_state(IngredientRouteState { db })
}
