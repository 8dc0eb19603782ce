//! REST endpoints for storing and fetching user profiles.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tracing::{info, warn};

use super::model::ProfileRequest;
use crate::store::Database;

/// Shared state for profile routes.
#[derive(Clone)]
pub struct ProfileRouteState {
    pub db: Arc<dyn Database>,
}

fn error_response(status: StatusCode, message: &str) -> axum::response::Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// POST /api/profile
///
/// Creates or replaces the profile keyed by `userId`.
async fn upsert_profile(
    State(state): State<ProfileRouteState>,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Rejected profile body");
            return error_response(StatusCode::BAD_REQUEST, "Missing required fields");
        }
    };

    if !request.has_required_fields() {
        return error_response(StatusCode::BAD_REQUEST, "Missing required fields");
    }

    match state.db.upsert_profile(&request).await {
        Ok(profile) => {
            info!(user_id = %profile.user_id, "Profile upserted");
            Json(profile).into_response()
        }
        Err(e) => {
            warn!(user_id = %request.user_id, error = %e, "Failed to store profile");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create profile")
        }
    }
}

/// GET /api/profile/{user_id}
async fn get_profile(
    State(state): State<ProfileRouteState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    match state.db.get_profile(&user_id).await {
        Ok(Some(profile)) => Json(profile).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Profile not found"),
        Err(e) => {
            warn!(user_id = %user_id, error = %e, "Failed to load profile");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch profile")
        }
    }
}

/// Build the profile REST routes.
pub fn profile_routes(db: Arc<dyn Database>) -> Router {
    Router::new()
        .route("/api/profile", post(upsert_profile))
        .route("/api/profile/{user_id}", get(get_profile))
        .with_state(ProfileRouteState { db })
}
